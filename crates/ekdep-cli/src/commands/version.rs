//! Handler for `ekdep version`.

use miette::Result;

use ekdep_ops::ops_version::{self, VersionAction, VersionPart};
use ekdep_util::progress;

use crate::cli::{Part, VersionCommand};

pub fn exec(command: Option<&VersionCommand>) -> Result<()> {
    let project_root = super::project_root()?;
    let action = match command {
        None | Some(VersionCommand::Print) => VersionAction::Print,
        Some(VersionCommand::Bump { part }) => VersionAction::Bump(match part {
            Part::Major => VersionPart::Major,
            Part::Minor => VersionPart::Minor,
            Part::Patch => VersionPart::Patch,
            Part::Build => VersionPart::Build,
        }),
        Some(VersionCommand::Set { version }) => VersionAction::Set(version.clone()),
    };

    let version = ops_version::version(&project_root, &action)?;
    if action == VersionAction::Print {
        println!("{version}");
    } else {
        progress::status("Updated", &format!("version to {version}"));
    }
    Ok(())
}
