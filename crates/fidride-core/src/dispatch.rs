//! Opening a [`RequestDeeplink`] on whatever can handle it.
//!
//! The decision is a single, synchronous lookup:
//! if the ride app is installed it gets the custom-scheme URI,
//! otherwise the same query goes to the mobile website.
//! A registry that can't answer is taken to mean "not installed".

use crate::adb::PackageId;
use crate::deeplink::{DeeplinkTarget, RequestDeeplink};
use log::info;
use serde::Serialize;

/// Package that owns the `uber://` scheme.
pub const RIDE_APP_PACKAGE: &str = "com.ubercab";

/// `android.content.Intent.ACTION_VIEW`
pub const ACTION_VIEW: &str = "android.intent.action.VIEW";

/// Answers whether an application is installed on the host device.
pub trait PackageRegistry {
    fn is_package_installed(&self, package: &PackageId) -> bool;
}

/// Starts activities on the host device.
pub trait ActivityLauncher {
    type Error;

    fn start_activity(&mut self, intent: &Intent) -> Result<(), Self::Error>;
}

/// The subset of an Android `Intent` a deeplink needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub action: &'static str,
    pub data: String,
    pub target: DeeplinkTarget,
}

impl Intent {
    #[must_use]
    pub fn view(data: String, target: DeeplinkTarget) -> Self {
        Self {
            action: ACTION_VIEW,
            data,
            target,
        }
    }
}

#[must_use]
pub fn ride_app_package() -> PackageId {
    PackageId::new_unchecked(RIDE_APP_PACKAGE.into())
}

impl RequestDeeplink {
    /// Pick the target for this link, without starting anything.
    #[must_use]
    pub fn resolve<R: PackageRegistry + ?Sized>(&self, registry: &R) -> Intent {
        let target = if registry.is_package_installed(&ride_app_package()) {
            DeeplinkTarget::App
        } else {
            DeeplinkTarget::MobileWeb
        };
        info!("Resolved ride request to {target}");
        Intent::view(self.uri_for(target), target)
    }

    /// Resolve, then start the resulting intent through `context`.
    ///
    /// The only possible error is the launcher's own.
    pub fn execute<C>(&self, context: &mut C) -> Result<Intent, C::Error>
    where
        C: PackageRegistry + ActivityLauncher + ?Sized,
    {
        let intent = self.resolve(&*context);
        context.start_activity(&intent)?;
        Ok(intent)
    }
}
