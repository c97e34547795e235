//! Site settings singleton
//!
//! Portal identity data lives in a single fixed-id storage row. It is data,
//! not process configuration: loaded through the repository on each request
//! and updated only through the admin endpoint.

use serde::{Deserialize, Serialize};

/// Fixed id of the singleton settings row
pub const SETTINGS_ROW_ID: i64 = 1;

/// The portal's public identity and contact channels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteSettings {
    pub entity_name: Option<String>,
    pub cnpj: Option<String>,
    /// Served crest image URL; changed only through the image-upload flow
    pub crest_url: Option<String>,
    pub primary_color: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub office_hours: Option<String>,
    pub official_site: Option<String>,
    pub official_gazette: Option<String>,
    pub taxpayer_portal: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub entity_email: Option<String>,
    pub ombudsman_link: Option<String>,
    pub ombudsman_phone: Option<String>,
    pub ombudsman_email: Option<String>,
}

/// Request body replacing the editable settings fields.
///
/// `crest_url` is deliberately absent: it only changes through the upload
/// flow, never through this endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateSettingsRequest {
    pub entity_name: Option<String>,
    pub cnpj: Option<String>,
    pub primary_color: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub office_hours: Option<String>,
    pub official_site: Option<String>,
    pub official_gazette: Option<String>,
    pub taxpayer_portal: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub entity_email: Option<String>,
    pub ombudsman_link: Option<String>,
    pub ombudsman_phone: Option<String>,
    pub ombudsman_email: Option<String>,
}

impl SiteSettings {
    /// Apply an update request, keeping the crest URL untouched
    pub fn apply(&mut self, update: UpdateSettingsRequest) {
        self.entity_name = update.entity_name;
        self.cnpj = update.cnpj;
        self.primary_color = update.primary_color;
        self.address = update.address;
        self.phone = update.phone;
        self.office_hours = update.office_hours;
        self.official_site = update.official_site;
        self.official_gazette = update.official_gazette;
        self.taxpayer_portal = update.taxpayer_portal;
        self.facebook = update.facebook;
        self.instagram = update.instagram;
        self.twitter = update.twitter;
        self.entity_email = update.entity_email;
        self.ombudsman_link = update.ombudsman_link;
        self.ombudsman_phone = update.ombudsman_phone;
        self.ombudsman_email = update.ombudsman_email;
    }
}
