//! A real Android device, reached over ADB, as a deeplink context.

use crate::adb::{ACommand, AdbBackend, PackageId};
use crate::dispatch::{ActivityLauncher, Intent, PackageRegistry};
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbDevice {
    backend: AdbBackend,
    /// Empty means "whatever ADB picks".
    serial: String,
    user_id: Option<u16>,
}

impl AdbDevice {
    #[must_use]
    pub fn new(backend: AdbBackend, serial: Option<String>, user_id: Option<u16>) -> Self {
        Self {
            backend,
            serial: serial.unwrap_or_default(),
            user_id,
        }
    }

    /// Devices ADB can currently talk to, i.e. with status "device".
    pub fn online(backend: AdbBackend) -> Result<Vec<String>, String> {
        Ok(ACommand::with_backend(backend)
            .devices()?
            .into_iter()
            .filter(|(_, status)| status == "device")
            .map(|(serial, _)| serial)
            .collect())
    }

    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        (!self.serial.is_empty()).then_some(self.serial.as_str())
    }

    fn shell(&self) -> crate::adb::ShellCommand {
        ACommand::with_backend(self.backend).shell(&self.serial)
    }

    /// Like [`PackageRegistry::is_package_installed`], but keeps ADB errors.
    pub fn try_is_package_installed(&self, package: &PackageId) -> Result<bool, String> {
        let listed = self.shell().pm().list_packages(Some(package), self.user_id)?;
        Ok(listed.iter().any(|p| p == package.as_str()))
    }
}

impl PackageRegistry for AdbDevice {
    fn is_package_installed(&self, package: &PackageId) -> bool {
        match self.try_is_package_installed(package) {
            Ok(installed) => {
                info!("{package} installed: {installed}");
                installed
            }
            Err(e) => {
                warn!("Cannot query packages, assuming {package} is absent: {e}");
                false
            }
        }
    }
}

impl ActivityLauncher for AdbDevice {
    type Error = String;

    fn start_activity(&mut self, intent: &Intent) -> Result<(), String> {
        self.shell().am().start(intent.action, &intent.data).map(|out| {
            info!("{out}");
        })
    }
}
