//! Finished campaigns, kept in memory until they expire.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::csrf::generate_token;
use crate::archive::{build_archive, encode_png};
use crate::campaign::CampaignReport;
use crate::constants::CAMPAIGN_RETENTION_MINUTES;
use crate::error::StudioError;

#[derive(Clone, Debug)]
pub(crate) struct StoredCampaign {
    created_at: DateTime<Utc>,
    archive: Bytes,
    previews: Vec<(usize, Bytes)>,
}

impl StoredCampaign {
    /// Encodes the report's previews and archive up front.
    pub(crate) fn from_report(report: &CampaignReport) -> Result<Self, StudioError> {
        let mut previews = Vec::with_capacity(report.variations.len());
        for variation in &report.variations {
            previews.push((variation.number, Bytes::from(encode_png(&variation.image)?)));
        }
        Ok(Self {
            created_at: Utc::now(),
            archive: Bytes::from(build_archive(report)?),
            previews,
        })
    }

    pub(crate) fn archive(&self) -> Bytes {
        self.archive.clone()
    }

    pub(crate) fn preview(&self, number: usize) -> Option<Bytes> {
        self.previews
            .iter()
            .find(|(candidate, _)| *candidate == number)
            .map(|(_, bytes)| bytes.clone())
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::minutes(CAMPAIGN_RETENTION_MINUTES)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CampaignStore {
    campaigns: Arc<RwLock<HashMap<String, Arc<StoredCampaign>>>>,
}

impl CampaignStore {
    /// Stores a campaign under a fresh id, dropping expired ones.
    pub(crate) async fn insert(&self, campaign: StoredCampaign) -> String {
        let id = generate_token();
        let now = Utc::now();
        let mut campaigns = self.campaigns.write().await;
        let before = campaigns.len();
        campaigns.retain(|_, stored| !stored.is_expired(now));
        if campaigns.len() != before {
            debug!("Pruned {} expired campaign(s)", before - campaigns.len());
        }
        campaigns.insert(id.clone(), Arc::new(campaign));
        id
    }

    pub(crate) async fn get(&self, id: &str) -> Option<Arc<StoredCampaign>> {
        let now = Utc::now();
        self.campaigns
            .read()
            .await
            .get(id)
            .filter(|stored| !stored.is_expired(now))
            .cloned()
    }
}
