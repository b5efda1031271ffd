//! Environment facts read by conditions and special-string interpolation.
//!
//! Responsibilities:
//! - Define the `Facts` provider trait (the seam conditions and the resolver read through).
//! - Provide `SystemFacts` (live machine) and `StaticFacts` (fixed values).
//! - Resolve `namespace:key` special strings (see `special.rs`).
//!
//! Does NOT handle:
//! - Comparing facts against condition values (see `condition::field`).
//!
//! Invariants:
//! - Platform and architecture names are reported in the portable vocabulary
//!   (`linux`, `darwin`, `win32`, ...; `x64`, `arm64`, `ia32`, ...).
//! - Reading a fact never fails; unavailable facts degrade to empty strings.

mod special;

use std::collections::HashMap;

pub use special::{FactValue, SPECIAL_STRINGS, resolve_special};

/// Source of live environment facts.
#[cfg_attr(test, mockall::automock)]
pub trait Facts: Send + Sync {
    /// Operating system platform (`linux`, `darwin`, `win32`, ...).
    fn platform(&self) -> String;
    /// CPU architecture (`x64`, `arm64`, `ia32`, ...).
    fn arch(&self) -> String;
    /// Operating system type as reported by uname (`Linux`, `Darwin`, `Windows_NT`).
    fn os_type(&self) -> String;
    /// Fully qualified host name.
    fn hostname(&self) -> String;
    fn cpus(&self) -> u64;
    fn cwd(&self) -> String;
    fn env(&self, name: &str) -> Option<String>;
    fn pid(&self) -> u64;
    fn ppid(&self) -> u64;
    /// Process arguments, excluding the executable.
    fn args(&self) -> Vec<String>;
    fn exec_path(&self) -> String;
    /// Path the process was invoked as.
    fn main_path(&self) -> String;
    fn version(&self) -> String;
    fn home_dir(&self) -> String;
    fn username(&self) -> String;
    fn eol(&self) -> String;
}

/// First label of a host name (`web1` for `web1.example.com`).
pub fn machine_name(hostname: &str) -> &str {
    match hostname.split('.').next() {
        Some(name) if !name.is_empty() => name,
        _ => hostname,
    }
}

/// Last two labels of a host name (`example.com` for `web1.example.com`).
pub fn domain_name(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".")
}

/// Facts read from the running process and machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFacts;

impl SystemFacts {
    pub fn new() -> Self {
        Self
    }
}

fn portable_platform(os: &str) -> String {
    let platform = match os {
        "macos" => "darwin",
        "windows" => "win32",
        "solaris" | "illumos" => "sunos",
        other => other,
    };
    platform.to_string()
}

fn portable_arch(arch: &str) -> String {
    let portable = match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        "powerpc" => "ppc",
        "powerpc64" => "ppc64",
        other => other,
    };
    portable.to_string()
}

fn os_type_for(platform: &str) -> String {
    let os_type = match platform {
        "linux" => "Linux",
        "darwin" => "Darwin",
        "win32" => "Windows_NT",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "sunos" => "SunOS",
        "aix" => "AIX",
        other => other,
    };
    os_type.to_string()
}

impl Facts for SystemFacts {
    fn platform(&self) -> String {
        portable_platform(std::env::consts::OS)
    }

    fn arch(&self) -> String {
        portable_arch(std::env::consts::ARCH)
    }

    fn os_type(&self) -> String {
        os_type_for(&self.platform())
    }

    fn hostname(&self) -> String {
        hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn cpus(&self) -> u64 {
        std::thread::available_parallelism()
            .map(|n| n.get() as u64)
            .unwrap_or(1)
    }

    fn cwd(&self) -> String {
        std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default()
    }

    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn pid(&self) -> u64 {
        u64::from(std::process::id())
    }

    #[cfg(unix)]
    fn ppid(&self) -> u64 {
        u64::from(std::os::unix::process::parent_id())
    }

    #[cfg(not(unix))]
    fn ppid(&self) -> u64 {
        0
    }

    fn args(&self) -> Vec<String> {
        std::env::args().skip(1).collect()
    }

    fn exec_path(&self) -> String {
        std::env::current_exe()
            .map(|path| path.display().to_string())
            .unwrap_or_default()
    }

    fn main_path(&self) -> String {
        std::env::args().next().unwrap_or_default()
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn home_dir(&self) -> String {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().display().to_string())
            .unwrap_or_default()
    }

    fn username(&self) -> String {
        ["USER", "USERNAME", "LOGNAME"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
            .or_else(|| {
                directories::BaseDirs::new().and_then(|dirs| {
                    dirs.home_dir()
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
            })
            .unwrap_or_default()
    }

    fn eol(&self) -> String {
        let eol = if cfg!(windows) { "\r\n" } else { "\n" };
        eol.to_string()
    }
}

/// Fixed facts, for reproducible evaluation and tests.
#[derive(Debug, Clone)]
pub struct StaticFacts {
    pub platform: String,
    pub arch: String,
    pub os_type: String,
    pub hostname: String,
    pub cpus: u64,
    pub cwd: String,
    pub env: HashMap<String, String>,
    pub pid: u64,
    pub ppid: u64,
    pub args: Vec<String>,
    pub exec_path: String,
    pub main_path: String,
    pub version: String,
    pub home_dir: String,
    pub username: String,
    pub eol: String,
}

impl Default for StaticFacts {
    fn default() -> Self {
        Self {
            platform: "linux".to_string(),
            arch: "x64".to_string(),
            os_type: "Linux".to_string(),
            hostname: "localhost".to_string(),
            cpus: 1,
            cwd: "/".to_string(),
            env: HashMap::new(),
            pid: 1,
            ppid: 0,
            args: Vec::new(),
            exec_path: "/usr/bin/app".to_string(),
            main_path: "app".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            home_dir: "/home/user".to_string(),
            username: "user".to_string(),
            eol: "\n".to_string(),
        }
    }
}

impl StaticFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the platform and the matching uname type.
    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = platform.to_string();
        self.os_type = os_type_for(platform);
        self
    }

    pub fn with_arch(mut self, arch: &str) -> Self {
        self.arch = arch.to_string();
        self
    }

    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    pub fn with_cpus(mut self, cpus: u64) -> Self {
        self.cpus = cpus;
        self
    }

    pub fn with_cwd(mut self, cwd: &str) -> Self {
        self.cwd = cwd.to_string();
        self
    }

    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env.insert(name.to_string(), value.to_string());
        self
    }
}

impl Facts for StaticFacts {
    fn platform(&self) -> String {
        self.platform.clone()
    }

    fn arch(&self) -> String {
        self.arch.clone()
    }

    fn os_type(&self) -> String {
        self.os_type.clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn cpus(&self) -> u64 {
        self.cpus
    }

    fn cwd(&self) -> String {
        self.cwd.clone()
    }

    fn env(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn pid(&self) -> u64 {
        self.pid
    }

    fn ppid(&self) -> u64 {
        self.ppid
    }

    fn args(&self) -> Vec<String> {
        self.args.clone()
    }

    fn exec_path(&self) -> String {
        self.exec_path.clone()
    }

    fn main_path(&self) -> String {
        self.main_path.clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn home_dir(&self) -> String {
        self.home_dir.clone()
    }

    fn username(&self) -> String {
        self.username.clone()
    }

    fn eol(&self) -> String {
        self.eol.clone()
    }
}
