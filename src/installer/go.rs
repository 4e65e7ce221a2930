use crate::args;
use crate::command::Runner;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

static MAJOR_VERSION_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v\d+$").unwrap());

/// Name of the binary `go install` produces for `package`. A trailing major version
/// segment such as `v2` is skipped in favour of the segment before it.
pub fn binary_name(package: &str) -> &str {
    let segments: Vec<&str> = package.split('/').collect();
    match segments.as_slice() {
        [.., name, last] if MAJOR_VERSION_SEGMENT.is_match(last) => *name,
        [.., last] => *last,
        [] => package,
    }
}

/// Installs `package` with `go install`. Without a version, the version the project's module
/// graph resolves for the package is used.
pub fn install(runner: &dyn Runner, package: &str, version: Option<&str>) -> Result<()> {
    let version = match version {
        Some(v) => v.to_string(),
        None => {
            let v = discover_version(runner, package)?;
            info!(%package, version = %v, "resolved version from module graph");
            v
        }
    };
    let version = normalize_version(&version);
    info!(binary = binary_name(package), %package, %version, "go install");
    runner.run(&args!["go", "install", format!("{package}@{version}")], true)?;
    Ok(())
}

/// The module path is some prefix of the package path, so try the longest first.
fn discover_version(runner: &dyn Runner, package: &str) -> Result<String> {
    let segments: Vec<&str> = package.split('/').collect();
    for len in (2..=segments.len()).rev() {
        let module = segments[..len].join("/");
        let (code, output) = runner.eval(&args!["go", "list", "-f", "{{.Version}}", "-m", module])?;
        let found = output.trim();
        if code == 0 && !found.is_empty() {
            return Ok(found.to_string());
        }
    }
    Err(Error::not_found(format!(
        "failed to find version for tool '{package}'"
    )))
}

fn normalize_version(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    #[test]
    fn binary_name_skips_major_version() {
        assert_eq!(binary_name("google.golang.org/protobuf/cmd/protoc-gen-go"), "protoc-gen-go");
        assert_eq!(binary_name("github.com/onsi/ginkgo/v2/ginkgo"), "ginkgo");
        assert_eq!(binary_name("github.com/golang/mock/mockgen/v5"), "mockgen");
        assert_eq!(binary_name("gotest.tools/gotestsum"), "gotestsum");
    }

    #[test]
    fn installs_with_prefixed_version() {
        let runner = FakeRunner::default();
        install(&runner, "google.golang.org/grpc/cmd/protoc-gen-go-grpc", Some("1.5.1")).unwrap();
        assert_eq!(
            runner.calls(),
            ["go install google.golang.org/grpc/cmd/protoc-gen-go-grpc@v1.5.1"]
        );
    }

    #[test]
    fn keeps_existing_prefix() {
        let runner = FakeRunner::default();
        install(&runner, "example.com/x/cmd/tool", Some("v0.3.0")).unwrap();
        assert_eq!(runner.calls(), ["go install example.com/x/cmd/tool@v0.3.0"]);
    }

    #[test]
    fn discovers_version_from_longest_module_prefix() {
        let runner = FakeRunner::default()
            .respond("go list -f {{.Version}} -m github.com/onsi/ginkgo/v2/ginkgo", 1, "not a module")
            .respond("go list -f {{.Version}} -m github.com/onsi/ginkgo/v2", 0, "v2.22.0\n");
        install(&runner, "github.com/onsi/ginkgo/v2/ginkgo", None).unwrap();
        assert_eq!(
            runner.calls(),
            [
                "go list -f {{.Version}} -m github.com/onsi/ginkgo/v2/ginkgo",
                "go list -f {{.Version}} -m github.com/onsi/ginkgo/v2",
                "go install github.com/onsi/ginkgo/v2/ginkgo@v2.22.0",
            ]
        );
    }

    #[test]
    fn undiscoverable_version_fails_without_installing() {
        let runner = FakeRunner::default()
            .respond("go list -f {{.Version}} -m github.com/onsi/ginkgo/v2/ginkgo", 1, "")
            .respond("go list -f {{.Version}} -m github.com/onsi/ginkgo/v2", 1, "")
            .respond("go list -f {{.Version}} -m github.com/onsi/ginkgo", 1, "")
            .respond("go list -f {{.Version}} -m github.com/onsi", 1, "");
        let err = install(&runner, "github.com/onsi/ginkgo/v2/ginkgo", None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        // Shortest prefix queried is two segments; nothing is installed.
        assert_eq!(runner.calls().len(), 4);
        assert_eq!(
            runner.calls().last().map(String::as_str),
            Some("go list -f {{.Version}} -m github.com/onsi")
        );
        assert!(runner.calls().iter().all(|c| c.starts_with("go list")));
    }
}
