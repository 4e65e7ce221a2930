mod archive;
mod go;
mod manifest;

use crate::command::Runner;
use crate::dirs::Dirs;
use crate::error::{Error, Result};
use crate::files::{ensure_dir, move_file};
use crate::platform::{platform, Target};
use crate::tools::{Registry, Tool, ToolId};
use crate::transport::Transport;
use fs_err as fs;
use manifest::Manifest;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

const GITHUB: &str = "https://github.com";
const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
const PROTOC_GEN_GO_PACKAGE: &str = "google.golang.org/protobuf/cmd/protoc-gen-go";
const PROTOC_GEN_GO_GRPC_PACKAGE: &str = "google.golang.org/grpc/cmd/protoc-gen-go-grpc";

/// What is on the search path for a tool, compared with its pinned version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Current(PathBuf),
    Outdated { path: PathBuf, found: String },
    Missing,
}

pub struct Installer<'a> {
    registry: &'a Registry,
    dirs: &'a Dirs,
    runner: &'a dyn Runner,
    transport: &'a dyn Transport,
    target: Target,
    scratch: PathBuf,
}

impl<'a> Installer<'a> {
    pub fn new(
        registry: &'a Registry,
        dirs: &'a Dirs,
        runner: &'a dyn Runner,
        transport: &'a dyn Transport,
    ) -> Self {
        Self {
            registry,
            dirs,
            runner,
            transport,
            target: Target::host(),
            scratch: std::env::temp_dir(),
        }
    }

    /// Overrides the OS/architecture used to pick release artifacts.
    #[cfg(test)]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Overrides where per-install temporary directories are created.
    #[cfg(test)]
    pub fn with_scratch(mut self, scratch: impl Into<PathBuf>) -> Self {
        self.scratch = scratch.into();
        self
    }

    /// Installs `ids` in order, stopping at the first failure.
    pub fn install_all(&self, ids: &[ToolId]) -> Result<()> {
        for id in ids {
            self.install(*id)?;
        }
        Ok(())
    }

    /// Installs one tool unless the pinned version is already on the search path.
    pub fn install(&self, id: ToolId) -> Result<()> {
        let tool = self.registry.get(id)?;
        match self.check_installed(tool)? {
            InstallState::Current(path) => {
                info!(
                    "Version {} of '{}' is already installed at '{}'",
                    tool.version,
                    tool.name,
                    path.display()
                );
                return Ok(());
            }
            InstallState::Outdated { path, found } => info!(
                "Found '{}' already installed at '{}', but version is '{}' instead of '{}'",
                tool.name,
                path.display(),
                found,
                tool.version
            ),
            InstallState::Missing => {}
        }
        info!("Installing version '{}' of '{}'", tool.version, tool.name);
        match id {
            ToolId::Buf => self.install_buf(tool),
            ToolId::Protoc => self.install_protoc(tool),
            ToolId::ProtocGenGo => go::install(self.runner, PROTOC_GEN_GO_PACKAGE, Some(&tool.version)),
            ToolId::ProtocGenGoGrpc => {
                go::install(self.runner, PROTOC_GEN_GO_GRPC_PACKAGE, Some(&tool.version))
            }
            ToolId::ProtocGenOpenapiv2 => self.install_protoc_gen_openapiv2(tool),
            ToolId::SwaggerCodegenCli => self.install_swagger_codegen_cli(tool),
        }
    }

    pub fn check_installed(&self, tool: &Tool) -> Result<InstallState> {
        let Some(path) = self.runner.find(&tool.name) else {
            return Ok(InstallState::Missing);
        };
        let (code, output) = self.runner.eval(&tool.version_command)?;
        if code != 0 {
            return Err(Error::Execution {
                command: tool.version_command.join(" "),
                code,
                output,
            });
        }
        let found = tool.extract_version(&output).ok_or_else(|| {
            Error::not_found(format!("failed to find version of installed '{}'", tool.name))
        })?;
        if found == tool.version {
            Ok(InstallState::Current(path))
        } else {
            Ok(InstallState::Outdated {
                path,
                found: found.to_string(),
            })
        }
    }

    fn install_buf(&self, tool: &Tool) -> Result<()> {
        let base = format!("{GITHUB}/bufbuild/buf/releases/download/v{}", tool.version);
        let manifest = Manifest::fetch(self.transport, tool, &base, "sha256.txt")?;
        let artifact = format!("buf-{}-{}.tar.gz", self.target.system, self.target.machine);
        let expected = manifest.checksum_for(&artifact)?;

        let tmp = self.temp_dir()?;
        let file = self.download_verified(tmp.path(), &base, &artifact, &expected)?;
        let local = self.dirs.local()?;
        ensure_dir(local)?;
        archive::extract_tar_gz(&file, local, 1)?;
        self.mark_executable(&tool.name)
    }

    /// protoc has no manifest of its own; the archive digest is pinned in the registry.
    fn install_protoc(&self, tool: &Tool) -> Result<()> {
        let artifact = format!(
            "protoc-{}-{}-{}.zip",
            tool.version,
            self.target.system.to_lowercase(),
            self.target.machine.to_lowercase()
        );
        let expected = tool.checksum(&artifact)?;
        let base = format!(
            "{GITHUB}/protocolbuffers/protobuf/releases/download/v{}",
            tool.version
        );

        let tmp = self.temp_dir()?;
        let file = self.download_verified(tmp.path(), &base, &artifact, expected)?;
        let local = self.dirs.local()?;
        ensure_dir(local)?;
        archive::extract_zip(&file, local)?;
        self.mark_executable(&tool.name)
    }

    fn install_protoc_gen_openapiv2(&self, tool: &Tool) -> Result<()> {
        let base = format!(
            "{GITHUB}/grpc-ecosystem/grpc-gateway/releases/download/v{}",
            tool.version
        );
        let manifest_name = format!("grpc-gateway_{}_checksums.txt", tool.version);
        let manifest = Manifest::fetch(self.transport, tool, &base, &manifest_name)?;
        let mut artifact = format!(
            "{}-v{}-{}-{}",
            tool.name,
            tool.version,
            self.target.system.to_lowercase(),
            self.target.machine.to_lowercase()
        );
        if self.target.is_windows() {
            artifact.push_str(".exe");
        }
        let expected = manifest.checksum_for(&artifact)?;

        let tmp = self.temp_dir()?;
        let file = self.download_verified(tmp.path(), &base, &artifact, &expected)?;
        let bin_dir = self.dirs.local_bin()?;
        ensure_dir(&bin_dir)?;
        move_file(&file, &bin_dir.join(platform().final_binary_name(&tool.name)))?;
        self.mark_executable(&tool.name)
    }

    /// The tool is a jar, so a shell wrapper in the local bin directory stands in for a binary.
    fn install_swagger_codegen_cli(&self, tool: &Tool) -> Result<()> {
        if self.runner.find("java").is_none() {
            return Err(Error::not_found("failed to find installed 'java'"));
        }
        let jar_name = format!("{}-{}.jar", tool.name, tool.version);
        let expected = tool.checksum(&jar_name)?;
        let base = format!(
            "{MAVEN_CENTRAL}/io/swagger/codegen/v3/{}/{}",
            tool.name, tool.version
        );

        let tmp = self.temp_dir()?;
        let file = self.download_verified(tmp.path(), &base, &jar_name, expected)?;
        let lib_dir = self.dirs.local_lib()?;
        ensure_dir(&lib_dir)?;
        let jar = lib_dir.join(format!("{}.jar", tool.name));
        move_file(&file, &jar)?;
        let jar = fs::canonicalize(&jar)?;

        let bin_dir = self.dirs.local_bin()?;
        ensure_dir(&bin_dir)?;
        let script = bin_dir.join(&tool.name);
        fs::write(&script, wrapper_script(&jar))?;
        platform().make_executable(&script)
    }

    /// Downloads `<base>/<artifact>` into `dir` and checks its digest. A `sha256sum` style
    /// listing is left next to the download.
    fn download_verified(
        &self,
        dir: &Path,
        base: &str,
        artifact: &str,
        expected: &str,
    ) -> Result<PathBuf> {
        let url = format!("{base}/{artifact}");
        let bytes = self.transport.get(&url)?;
        let file = dir.join(artifact);
        fs::write(&file, &bytes)?;
        fs::write(
            dir.join(format!("{artifact}.sha256")),
            format!("{expected}  {}\n", file.display()),
        )?;
        manifest::verify_file(&file, expected)?;
        Ok(file)
    }

    /// Removed when dropped, whether or not the install succeeded.
    fn temp_dir(&self) -> Result<TempDir> {
        Ok(tempfile::Builder::new().prefix("dev-").tempdir_in(&self.scratch)?)
    }

    fn mark_executable(&self, name: &str) -> Result<()> {
        let bin = self.dirs.local_bin()?.join(platform().final_binary_name(name));
        platform().make_executable(&bin)
    }
}

fn wrapper_script(jar: &Path) -> String {
    format!(
        "#!/bin/sh\nexec java -jar \"{}\" \"$@\"\n",
        jar.display()
    )
}
