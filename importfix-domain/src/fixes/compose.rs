use super::DeferredFix;
use crate::error::FixError;
use camino::Utf8PathBuf;
use importfix_edit::{replace_name, text_at};
use importfix_solution::Solution;
use importfix_types::ids::ProjectId;
use importfix_types::reference::{ReferenceHandle, ReferenceProperties};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The reference a fix attaches after inserting its import.
pub(super) enum Attachment {
    Nothing,
    Project(ProjectId),
    Assembly(Utf8PathBuf),
    Package {
        name: String,
        version: Option<String>,
        path: Utf8PathBuf,
    },
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), FixError> {
    if cancel.is_cancelled() {
        Err(FixError::Cancelled)
    } else {
        Ok(())
    }
}

impl DeferredFix {
    pub(super) fn compose(
        &self,
        original: &Solution,
        attachment: Attachment,
        cancel: &CancellationToken,
    ) -> Result<Solution, FixError> {
        let target = &self.target;
        let result = &self.reference.result;

        let document = original.document(target.document).ok_or_else(|| {
            FixError::conflict(format!("{} is not part of the solution", target.document))
        })?;
        if document.project_id() != target.project {
            return Err(FixError::conflict(format!(
                "{} moved to another project",
                document.path()
            )));
        }
        if document.checksum() != target.checksum {
            warn!(document = %document.path(), "document changed since the fix was offered");
            return Err(FixError::conflict(format!(
                "{} changed since the fix was offered",
                document.path()
            )));
        }

        let document = if text_at(&document, target.name_range)? != result.desired_name {
            debug!(
                document = %document.path(),
                name = %result.desired_name,
                "renaming to desired name"
            );
            replace_name(&document, target.name_range, &result.desired_name)?
        } else {
            document
        };
        checkpoint(cancel)?;

        let (edit, document) = self.services.imports.insert_import(
            &document,
            &result.name_parts,
            self.place_system_first,
            cancel,
        )?;
        debug!(
            namespace = %edit.namespace,
            inserted = !edit.is_noop(),
            "import step finished"
        );

        if document.solution().workspace() != original.workspace() {
            return Err(FixError::conflict(
                "import insertion produced a document from another workspace",
            ));
        }
        if document.project_id() != target.project {
            return Err(FixError::conflict(
                "import insertion produced a document from another project",
            ));
        }
        checkpoint(cancel)?;

        let project = document.project();
        let project = match attachment {
            Attachment::Nothing => project,
            Attachment::Project(to) => project
                .with_added_project_reference(to)
                .map_err(|e| FixError::conflict(e.to_string()))?,
            Attachment::Assembly(path) => {
                let handle = self
                    .services
                    .metadata
                    .get_reference(&path, ReferenceProperties::assembly())?;
                project.with_added_reference(handle)
            }
            Attachment::Package {
                name,
                version,
                path,
            } => project
                .with_added_reference(ReferenceHandle::package(name, version).with_path(path)),
        };

        debug!(
            project = %project.name(),
            version = project.solution().version(),
            "composed fix"
        );
        Ok(project.solution().clone())
    }
}
