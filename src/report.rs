use tracing::{error, info, warn};

use crate::api::LostFoundApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{Item, ItemKind, NewItem};
use crate::storage::ImageStore;

/// Descriptions must be strictly longer than this many characters.
pub const MIN_DESCRIPTION_LEN: usize = 50;

/// Campus locations a report may name.
pub const LOCATIONS: &[&str] = &[
    "Library",
    "Café",
    "Student Center",
    "Gymnasium",
    "Lecture Hall",
    "Laboratory",
    "Parking Lot",
    "Dormitory",
    "Other",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Report form state. It stays populated after a failed submission.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub brand: String,
    pub other_info: Vec<String>,
    image: Option<ImageFile>,
    uploaded_image_url: Option<String>,
    /// Ask the server for a description generated from the uploaded image.
    pub generate_description: bool,
}

impl ReportForm {
    pub fn set_image(&mut self, image: Option<ImageFile>) {
        self.image = image;
        self.uploaded_image_url = None;
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    /// URL of the already-uploaded image, reused on resubmission.
    pub fn uploaded_image_url(&self) -> Option<&str> {
        self.uploaded_image_url.as_deref()
    }

    fn payload(&self) -> NewItem {
        let brand = self.brand.trim();
        NewItem {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            brand: (!brand.is_empty()).then(|| brand.to_string()),
            image_url: self.uploaded_image_url.clone(),
            other_info: self
                .other_info
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub item: Item,
    /// Non-fatal problems worth telling the user about.
    pub warnings: Vec<String>,
}

fn validate_fields(kind: ItemKind, form: &ReportForm) -> ClientResult<()> {
    if form.title.trim().is_empty() {
        return Err(ClientError::validation("title is required"));
    }
    let location = form.location.trim();
    if location.is_empty() {
        return Err(ClientError::validation("location is required"));
    }
    if !LOCATIONS.contains(&location) {
        return Err(ClientError::validation(format!("unknown location '{location}'")));
    }
    if kind == ItemKind::Found && form.image.is_none() && form.uploaded_image_url.is_none() {
        return Err(ClientError::validation("an image is required for found items"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> ClientResult<()> {
    let len = description.trim().chars().count();
    if len <= MIN_DESCRIPTION_LEN {
        return Err(ClientError::validation(format!(
            "description must be more than {MIN_DESCRIPTION_LEN} characters (got {len})"
        )));
    }
    Ok(())
}

/// Upload the image (if any), optionally generate a description, validate,
/// then create the report.
///
/// Everything that can be checked locally is checked before the first request.
/// An upload failure aborts; a caption failure only adds a warning.
pub async fn submit_report<A>(
    api: &A,
    images: Option<&dyn ImageStore>,
    kind: ItemKind,
    form: &mut ReportForm,
) -> ClientResult<Submission>
where
    A: LostFoundApi + ?Sized,
{
    validate_fields(kind, form)?;
    let will_caption = form.generate_description && (form.image.is_some() || form.uploaded_image_url.is_some());
    if !will_caption {
        validate_description(&form.description)?;
    }

    if form.uploaded_image_url.is_none() {
        if let Some(image) = &form.image {
            let store = images.ok_or_else(|| ClientError::ImageUpload("image storage is not configured".into()))?;
            let url = store.upload(&image.file_name, &image.bytes).await.map_err(|e| {
                error!(file = %image.file_name, "image upload failed: {e}");
                ClientError::from(e)
            })?;
            info!(%url, "image uploaded");
            form.uploaded_image_url = Some(url);
        }
    }

    let mut warnings = Vec::new();
    if will_caption {
        if let Some(url) = form.uploaded_image_url.clone() {
            match api.generate_caption(&url).await {
                Ok(caption) if !caption.trim().is_empty() => form.description = caption.trim().to_string(),
                Ok(_) => warnings.push("No description could be generated; please enter one manually".to_string()),
                Err(e) => {
                    warn!("caption generation failed: {e}");
                    warnings.push("Could not generate a description; please enter one manually".to_string());
                }
            }
        }
        validate_description(&form.description)?;
    }

    let item = api.create_item(kind, &form.payload()).await?;
    info!(item_id = %item.id, %kind, "report created");
    Ok(Submission { item, warnings })
}
