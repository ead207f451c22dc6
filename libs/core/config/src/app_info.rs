//! Application identity (name, version) for health endpoints and logs.

/// Name and version of the running binary, as seen by `/health` and
/// startup log lines.
#[derive(Clone, Debug)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// Build an `AppInfo` from the calling crate's `CARGO_PKG_NAME`/`CARGO_PKG_VERSION`.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::app_info::AppInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_app_info_macro() {
        let info = crate::app_info!();
        assert_eq!(info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }
}
