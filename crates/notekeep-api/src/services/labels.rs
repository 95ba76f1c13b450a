//! Label management service.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use notekeep_core::validation::{
    label_names_equal, normalize_label_name, validate_id, validate_owner,
};
use notekeep_core::{
    CreateLabelRequest, Error, Label, LabelRepository, NewLabel, Owned, Result,
    UpdateLabelRequest,
};

const DUPLICATE_NAME: &str = "A label with this name already exists";

/// Label CRUD for a single owner's label namespace.
#[derive(Clone)]
pub struct LabelService {
    labels: Arc<dyn LabelRepository>,
}

impl LabelService {
    pub fn new(labels: Arc<dyn LabelRepository>) -> Self {
        Self { labels }
    }

    async fn load_owned(&self, owner_id: i64, label_id: i64) -> Result<Label> {
        validate_owner(owner_id)?;
        validate_id(label_id, "label")?;
        let label = self
            .labels
            .fetch(label_id)
            .await?
            .ok_or(Error::LabelNotFound(label_id))?;
        label.ensure_owned_by(owner_id)?;
        Ok(label)
    }

    /// The owner's labels ordered by name.
    pub async fn list(&self, owner_id: i64) -> Result<Vec<Label>> {
        validate_owner(owner_id)?;
        self.labels.list(owner_id).await
    }

    pub async fn get(&self, owner_id: i64, label_id: i64) -> Result<Label> {
        self.load_owned(owner_id, label_id).await
    }

    pub async fn create(&self, owner_id: i64, req: CreateLabelRequest) -> Result<Label> {
        validate_owner(owner_id)?;
        let name = normalize_label_name(req.name.as_deref())?;
        if self.labels.exists_for_owner(&name, owner_id, None).await? {
            return Err(Error::Validation(DUPLICATE_NAME.to_string()));
        }

        let label = self
            .labels
            .insert(NewLabel {
                owner_id,
                name,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            subsystem = "labels",
            component = "crud",
            op = "create",
            label_id = label.id,
            owner_id,
            "Label created"
        );
        Ok(label)
    }

    /// Rename a label. A name equal to the current one (ignoring case) changes nothing.
    pub async fn update(&self, owner_id: i64, label_id: i64, req: UpdateLabelRequest) -> Result<Label> {
        let mut label = self.load_owned(owner_id, label_id).await?;
        let name = normalize_label_name(req.name.as_deref())?;

        if label_names_equal(&label.name, &name) {
            return Ok(label);
        }
        if self
            .labels
            .exists_for_owner(&name, owner_id, Some(label_id))
            .await?
        {
            return Err(Error::Validation(DUPLICATE_NAME.to_string()));
        }

        self.labels.rename(label_id, &name).await?;
        info!(
            subsystem = "labels",
            component = "crud",
            op = "rename",
            label_id,
            owner_id,
            "Label renamed"
        );
        label.name = name;
        Ok(label)
    }

    /// Delete a label; its note associations go with it.
    pub async fn delete(&self, owner_id: i64, label_id: i64) -> Result<()> {
        let label = self.load_owned(owner_id, label_id).await?;
        if !self.labels.delete(label.id).await? {
            return Err(Error::LabelNotFound(label_id));
        }
        info!(
            subsystem = "labels",
            component = "crud",
            op = "delete",
            label_id,
            owner_id,
            "Label deleted"
        );
        Ok(())
    }
}
