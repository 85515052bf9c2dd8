//! Announcement drafting and publishing.
//!
//! Drafting is delegated to an external text generator; this module only
//! defines the boundary and the prompt it is given.

use crate::model::announcement::Announcement;
use crate::model::new_record_id;
use crate::repo::EntityRepository;
use crate::service::{required, ServiceResult, ValidationError};
use crate::working_set::{LoadState, WorkingSet};
use async_trait::async_trait;
use chrono::Local;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const DEFAULT_TITLE: &str = "Pengumuman Baru";

/// Register of the generated announcement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Formal,
    Casual,
    Urgent,
}

impl Tone {
    fn label(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "santai",
            Self::Urgent => "penting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    Unavailable(String),
    Empty,
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "draft generator unavailable: {reason}"),
            Self::Empty => write!(f, "draft generator returned no text"),
        }
    }
}

impl Error for DraftError {}

/// Opaque text-generation collaborator: prompt in, text out.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DraftError>;
}

pub struct AnnouncementService {
    repo: Arc<dyn EntityRepository<Announcement>>,
    set: Arc<WorkingSet<Announcement>>,
}

impl AnnouncementService {
    pub fn new(
        repo: Arc<dyn EntityRepository<Announcement>>,
        set: Arc<WorkingSet<Announcement>>,
    ) -> Self {
        Self { repo, set }
    }

    pub fn working_set(&self) -> &Arc<WorkingSet<Announcement>> {
        &self.set
    }

    pub async fn load(&self) -> ServiceResult<LoadState> {
        Ok(self.set.load(self.repo.as_ref()).await?)
    }

    /// Asks `generator` for announcement text about `topic`.
    pub async fn draft(
        &self,
        generator: &dyn DraftGenerator,
        topic: &str,
        tone: Tone,
    ) -> Result<String, DraftError> {
        let topic = topic.trim();
        let text = generator.generate(&draft_prompt(topic, tone)).await;
        match text {
            Ok(text) if text.trim().is_empty() => Err(DraftError::Empty),
            Ok(text) => {
                info!(
                    "event=announcement_draft module=service status=ok tone={} chars={}",
                    tone.label(),
                    text.chars().count()
                );
                Ok(text)
            }
            Err(err) => {
                warn!(
                    "event=announcement_draft module=service status=error tone={} error={}",
                    tone.label(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Publishes `content` dated today; a blank title becomes `Pengumuman Baru`.
    pub async fn publish(
        &self,
        title: &str,
        content: &str,
        is_ai_generated: bool,
    ) -> ServiceResult<Announcement> {
        let announcement = build_announcement(title, content, is_ai_generated)?;
        self.set
            .save(self.repo.as_ref(), announcement.clone())
            .await?;
        Ok(announcement)
    }
}

fn build_announcement(
    title: &str,
    content: &str,
    is_ai_generated: bool,
) -> Result<Announcement, ValidationError> {
    let content = required(content, "content")?;
    let title = match title.trim() {
        "" => DEFAULT_TITLE.to_string(),
        trimmed => trimmed.to_string(),
    };
    Ok(Announcement {
        id: new_record_id(),
        title,
        content,
        date: Local::now().date_naive(),
        is_ai_generated,
    })
}

fn draft_prompt(topic: &str, tone: Tone) -> String {
    format!(
        "Buatkan teks pengumuman untuk warga RT/RW di Indonesia.\n\
         Topik: {topic}\n\
         Nada Bahasa: {}\n\
         Pastikan formatnya rapi, sopan, dan mudah dibaca di WhatsApp atau papan pengumuman.\n\
         Hanya berikan teks pengumuman.",
        tone.label()
    )
}
