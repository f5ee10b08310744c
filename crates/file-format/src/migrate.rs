use tracing::debug;

use crate::errors::LoadError;

/// One upgrade of the document XML by a single format version.
type Step = fn(&str) -> Result<String, String>;

/// Upgrade steps by the version they start from. Version 1 is the first
/// archive format, so there are none yet.
const STEPS: &[(u32, Step)] = &[];

/// Bring document XML written at `from_version` up to `to_version`, one
/// version at a time.
pub fn migrate(document_xml: &str, from_version: u32, to_version: u32) -> Result<String, LoadError> {
    if from_version > to_version {
        return Err(LoadError::MigrationFailed {
            from: from_version,
            to: to_version,
            reason: "archives cannot be downgraded".to_string(),
        });
    }

    let mut xml = document_xml.to_string();
    for version in from_version..to_version {
        let step = STEPS
            .iter()
            .find(|(start, _)| *start == version)
            .map(|(_, step)| *step)
            .ok_or_else(|| LoadError::MigrationFailed {
                from: version,
                to: version + 1,
                reason: format!("no upgrade from v{version}"),
            })?;
        xml = step(&xml).map_err(|reason| LoadError::MigrationFailed {
            from: version,
            to: version + 1,
            reason,
        })?;
        debug!(from = version, to = version + 1, "document migrated");
    }
    Ok(xml)
}
