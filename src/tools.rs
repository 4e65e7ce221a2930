use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolId {
    Buf,
    Protoc,
    ProtocGenGo,
    ProtocGenGoGrpc,
    ProtocGenOpenapiv2,
    SwaggerCodegenCli,
}

impl ToolId {
    /// Installation order used by `setup`.
    pub const ALL: [ToolId; 6] = [
        ToolId::Buf,
        ToolId::Protoc,
        ToolId::ProtocGenGo,
        ToolId::ProtocGenGoGrpc,
        ToolId::ProtocGenOpenapiv2,
        ToolId::SwaggerCodegenCli,
    ];
}

/// Pinned description of an external tool.
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: String,
    pub version: String,
    pub version_command: Vec<String>,
    pub version_pattern: Regex,
    /// Artifact file name -> expected sha256 (lowercase hex).
    pub checksums: HashMap<String, String>,
}

impl Tool {
    /// Builds a descriptor, substituting `{name}` and `{version}` in checksum keys.
    /// Any other placeholder left in a key, or a pattern without a `version` group, is rejected.
    pub fn new(
        name: &str,
        version: &str,
        version_command: &[&str],
        version_pattern: &str,
        checksums: &[(&str, &str)],
    ) -> Result<Self> {
        let pattern = Regex::new(&format!("(?m){version_pattern}"))
            .map_err(|e| Error::config(format!("invalid version pattern for '{name}': {e}")))?;
        if !pattern.capture_names().flatten().any(|n| n == "version") {
            return Err(Error::config(format!(
                "version pattern for '{name}' has no 'version' group"
            )));
        }
        let mut resolved = HashMap::with_capacity(checksums.len());
        for (template, digest) in checksums {
            let key = template.replace("{name}", name).replace("{version}", version);
            if let Some(m) = PLACEHOLDER.find(&key) {
                return Err(Error::config(format!(
                    "unresolved placeholder '{}' in checksum key '{template}' of '{name}'",
                    m.as_str()
                )));
            }
            resolved.insert(key, digest.to_ascii_lowercase());
        }
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            version_command: version_command.iter().map(|s| s.to_string()).collect(),
            version_pattern: pattern,
            checksums: resolved,
        })
    }

    /// Pulls the version out of the output of `version_command`.
    pub fn extract_version<'a>(&self, output: &'a str) -> Option<&'a str> {
        self.version_pattern
            .captures(output)
            .and_then(|c| c.name("version"))
            .map(|m| m.as_str().trim_end_matches('\r'))
    }

    pub fn checksum(&self, artifact: &str) -> Result<&str> {
        self.checksums.get(artifact).map(String::as_str).ok_or_else(|| {
            Error::not_found(format!(
                "no pinned checksum for artifact '{artifact}' of '{}'",
                self.name
            ))
        })
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// The pinned tool catalog. Built once in `main` and shared read-only.
#[derive(Debug)]
pub struct Registry {
    tools: BTreeMap<ToolId, Tool>,
}

impl Registry {
    pub fn builtin() -> Result<Self> {
        let mut tools = BTreeMap::new();
        tools.insert(
            ToolId::Buf,
            Tool::new(
                "buf",
                "1.50.0",
                &["buf", "--version"],
                r"^(?P<version>.*)$",
                &[(
                    "sha256.txt",
                    "736e74d1697dcf253bc60b2f0fb4389c39dbc7be68472a7d564a953df8b19d12",
                )],
            )?,
        );
        tools.insert(
            ToolId::Protoc,
            Tool::new(
                "protoc",
                "29.3",
                &["protoc", "--version"],
                r"^libprotoc\s+(?P<version>.*)$",
                &[(
                    "{name}-{version}-linux-x86_64.zip",
                    "3e866620c5be27664f3d2fa2d656b5f3e09b5152b42f1bedbf427b333e90021a",
                )],
            )?,
        );
        tools.insert(
            ToolId::ProtocGenGo,
            Tool::new(
                "protoc-gen-go",
                "1.36.4",
                &["protoc-gen-go", "--version"],
                r"^protoc-gen-go\s+v(?P<version>.*)$",
                &[],
            )?,
        );
        tools.insert(
            ToolId::ProtocGenGoGrpc,
            Tool::new(
                "protoc-gen-go-grpc",
                "1.5.1",
                &["protoc-gen-go-grpc", "--version"],
                r"^protoc-gen-go-grpc\s+(?P<version>.*)$",
                &[],
            )?,
        );
        tools.insert(
            ToolId::ProtocGenOpenapiv2,
            Tool::new(
                "protoc-gen-openapiv2",
                "2.26.1",
                &["protoc-gen-openapiv2", "--version"],
                r"^Version\s+(?P<version>[^,]+),.*$",
                &[(
                    "grpc-gateway_{version}_checksums.txt",
                    "577b704088b2748342563d2c59e883b5dee8148cab08966e59dda16c3981cfbe",
                )],
            )?,
        );
        tools.insert(
            ToolId::SwaggerCodegenCli,
            Tool::new(
                "swagger-codegen-cli",
                "3.0.67",
                &["swagger-codegen-cli", "version"],
                r"^(?P<version>.*)$",
                &[(
                    "{name}-{version}.jar",
                    "7ec19718a723fd66035d2f26e76ba23dcfb623795dd51c6983b162f49ec1dd1d",
                )],
            )?,
        );
        Ok(Self { tools })
    }

    pub fn get(&self, id: ToolId) -> Result<&Tool> {
        self.tools
            .get(&id)
            .ok_or_else(|| Error::not_found(format!("tool {id:?} is not registered")))
    }

    pub fn find(&self, name: &str) -> Option<(ToolId, &Tool)> {
        self.tools
            .iter()
            .find(|(_, t)| t.name == name)
            .map(|(id, t)| (*id, t))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToolId, &Tool)> {
        self.tools.iter().map(|(id, t)| (*id, t))
    }

    #[cfg(test)]
    pub fn from_tools(tools: impl IntoIterator<Item = (ToolId, Tool)>) -> Self {
        Self {
            tools: tools.into_iter().collect(),
        }
    }
}
