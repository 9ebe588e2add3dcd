#![deny(clippy::unwrap_used)]

//! Thin wrappers around the Android Debug Bridge,
//! limited to what opening a deeplink on a device needs:
//! - listing attached devices
//! - asking the package manager whether an app is installed
//! - asking the activity manager to view a URI
//!
//! Every `*Command` maps 1-to-1 to an `adb` invocation.
//! No chaining, no custom commands.
//! If a new ADB feature is ever needed, extend these builders
//! rather than reaching for a `Command`-like API elsewhere.
//!
//! ## Backend Selection
//!
//! - **Builtin** (`adb_client`): Pure Rust implementation, no external dependencies
//! - **System**: Uses the system-installed `adb` binary
//!
//! [More info](https://developer.android.com/tools/adb)

use adb_client::{ADBDeviceExt, ADBServer};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Cursor;

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use crate::utils::{is_all_w_c, sh_single_quote};
use log::{error, info};

/// Device output, decoded leniently and without the trailing newline.
#[must_use]
pub fn to_trimmed_utf8(v: &[u8]) -> String {
    String::from_utf8_lossy(v).trim_end().to_string()
}

/// Which ADB implementation talks to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdbBackend {
    /// `adb_client`, speaking to the ADB server directly.
    #[default]
    Builtin,
    /// The `adb` binary found in PATH.
    System,
}

impl std::fmt::Display for AdbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "Builtin"),
            Self::System => write!(f, "System (adb)"),
        }
    }
}

/// `adb devices` body: one `<serial>\t<status>` pair per line, header already gone.
fn parse_device_lines<'a, I: Iterator<Item = &'a str>>(lines: I) -> Vec<(String, String)> {
    lines
        .filter_map(|line| {
            let (serial, status) = line.split_once('\t')?;
            Some((serial.trim().to_string(), status.trim().to_string()))
        })
        .collect()
}

/// Entry point of every ADB invocation; pick a backend, then a sub-command.
#[derive(Debug)]
pub struct ACommand {
    backend: AdbBackend,
    serial: Option<String>,
}

impl ACommand {
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(AdbBackend::default())
    }

    #[must_use]
    pub const fn with_backend(backend: AdbBackend) -> Self {
        Self {
            backend,
            serial: None,
        }
    }

    /// Shell on the device with this serial; an empty serial targets ADB's default device.
    #[must_use]
    pub fn shell<S: AsRef<str>>(mut self, device_serial: S) -> ShellCommand {
        self.serial = Some(device_serial.as_ref())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        ShellCommand(self)
    }

    /// Serials of attached devices with their status ("device", "unauthorized", ...).
    pub fn devices(self) -> Result<Vec<(String, String)>, String> {
        match self.backend {
            AdbBackend::Builtin => ADBServer::default()
                .devices()
                .map(|found| {
                    found
                        .into_iter()
                        .map(|dev| (dev.identifier, dev.state.to_string()))
                        .collect()
                })
                .map_err(|e| {
                    error!("ADB server unreachable: {e}");
                    format!("Cannot connect to ADB server: {e}")
                }),
            AdbBackend::System => {
                let mut cmd = std::process::Command::new("adb");
                cmd.arg("devices");
                let out = Self::spawn_adb(cmd)?;
                Ok(parse_device_lines(out.lines().skip(1)))
            }
        }
    }

    fn shell_via_client(&self, line: &str) -> Result<String, String> {
        let mut server = ADBServer::default();
        let mut device = match &self.serial {
            Some(serial) => server
                .get_device_by_name(serial)
                .map_err(|e| format!("Device '{serial}' unavailable: {e}"))?,
            None => server
                .get_device()
                .map_err(|e| format!("No device to talk to: {e}"))?,
        };

        let argv: Vec<&str> = line.split_whitespace().collect();
        if argv.is_empty() {
            return Err("Empty shell command".into());
        }
        info!("adb shell {line}");

        let mut buffer = Vec::new();
        device
            .shell_command(&argv, &mut Cursor::new(&mut buffer))
            .map_err(|e| {
                error!("adb shell {line} failed: {e}");
                format!("Shell command failed: {e}")
            })?;
        Ok(to_trimmed_utf8(&buffer))
    }

    fn shell_via_binary(&self, line: &str) -> Result<String, String> {
        let mut cmd = std::process::Command::new("adb");
        if let Some(serial) = &self.serial {
            cmd.args(["-s", serial]);
        }
        cmd.args(["shell", line]);
        Self::spawn_adb(cmd)
    }

    /// Stdout on success; otherwise whichever stream holds the complaint,
    /// as `adb` prints some errors to stdout.
    fn spawn_adb(mut cmd: std::process::Command) -> Result<String, String> {
        #[cfg(target_os = "windows")]
        let cmd = cmd.creation_flags(0x0800_0000); // CREATE_NO_WINDOW

        let args: Vec<_> = cmd.get_args().filter_map(|s| s.to_str()).collect();
        info!("adb {}", args.join(" "));

        let output = cmd.output().map_err(|e| {
            error!("Cannot spawn adb: {e}");
            "Cannot run ADB, likely not found".to_string()
        })?;

        let stdout = to_trimmed_utf8(&output.stdout);
        match (output.status.success(), stdout.is_empty()) {
            (true, _) => Ok(stdout),
            (false, true) => Err(to_trimmed_utf8(&output.stderr)),
            (false, false) => Err(stdout),
        }
    }

    fn run_shell_command(&self, line: &str) -> Result<String, String> {
        match self.backend {
            AdbBackend::Builtin => self.shell_via_client(line),
            AdbBackend::System => self.shell_via_binary(line),
        }
    }
}

impl Default for ACommand {
    fn default() -> Self {
        Self::new()
    }
}

/// A command line for the device's `sh`.
#[derive(Debug)]
pub struct ShellCommand(ACommand);

impl ShellCommand {
    /// `pm` command builder
    #[must_use]
    pub fn pm(self) -> PmCommand {
        PmCommand(self)
    }

    /// `am` command builder
    #[must_use]
    pub fn am(self) -> AmCommand {
        AmCommand(self)
    }

    /// The action string is interpreted by the remote shell,
    /// so anything with metacharacters must be quoted by the caller.
    fn raw(self, action: &str) -> Result<String, String> {
        self.0.run_shell_command(action)
    }
}

#[must_use]
pub const fn is_pkg_component(s: &[u8]) -> bool {
    !s.is_empty() && s[0].is_ascii_alphabetic() && (s.len() == 1 || is_all_w_c(s.split_at(1).1))
}

/// String with the invariant of being a valid package-name.
/// See [`PackageId::new`] for validation details.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
pub struct PackageId(Box<str>);
impl PackageId {
    /// Creates a package-ID if it's valid according to
    /// <https://developer.android.com/build/configure-app-module#set-application-id>
    #[must_use]
    pub fn new(p_id: Box<str>) -> Option<Self> {
        let mut components = p_id.split('.');
        for _ in 0..2 {
            if !components
                .next()
                .is_some_and(|comp| is_pkg_component(comp.as_bytes()))
            {
                return None;
            }
        }
        if components.all(|comp| is_pkg_component(comp.as_bytes())) {
            Some(Self(p_id))
        } else {
            None
        }
    }

    /// For compile-time constants known to be valid.
    #[must_use]
    pub(crate) fn new_unchecked(p_id: Box<str>) -> Self {
        debug_assert!(Self::new(p_id.clone()).is_some());
        Self(p_id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

const PACK_PREFIX: &str = "package:";

/// Builder object for an Android Package Manager command.
/// <https://developer.android.com/tools/adb#pm>
#[derive(Debug)]
pub struct PmCommand(ShellCommand);
impl PmCommand {
    /// `list packages [--user <id>] [<filter>]`, [`PACK_PREFIX`] stripped.
    ///
    /// `filter` is a substring match on the device side,
    /// so the result may hold more than the exact package asked for.
    pub fn list_packages(
        self,
        filter: Option<&PackageId>,
        user_id: Option<u16>,
    ) -> Result<Vec<String>, String> {
        let mut command = String::from("pm list packages");
        if let Some(uid) = user_id {
            write!(&mut command, " --user {uid}").ok();
        }
        if let Some(p_id) = filter {
            write!(&mut command, " {p_id}").ok();
        }

        self.0.raw(&command).map(|output| {
            output
                .lines()
                .filter_map(|line| line.strip_prefix(PACK_PREFIX))
                .map(str::to_string)
                .collect()
        })
    }
}

/// Builder object for an Android Activity Manager command.
/// <https://developer.android.com/tools/adb#am>
#[derive(Debug)]
pub struct AmCommand(ShellCommand);
impl AmCommand {
    /// `start -a <action> -d <uri>`
    ///
    /// `am` prints `Error: ...` and still exits 0 when nothing handles the intent,
    /// so the output is inspected too.
    pub fn start(self, action: &str, data: &str) -> Result<String, String> {
        let output = self
            .0
            .raw(&format!("am start -a {action} -d {}", sh_single_quote(data)))?;
        match output.lines().find(|ln| ln.starts_with("Error")) {
            Some(err) => Err(err.to_string()),
            None => Ok(output),
        }
    }
}
