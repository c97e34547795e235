//! Site settings repository
//!
//! The settings table holds exactly one row with a fixed id. Reads create
//! the empty row on first access so updates always have a target.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{SiteSettings, SETTINGS_ROW_ID};

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    entity_name: Option<String>,
    cnpj: Option<String>,
    crest_url: Option<String>,
    primary_color: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    office_hours: Option<String>,
    official_site: Option<String>,
    official_gazette: Option<String>,
    taxpayer_portal: Option<String>,
    facebook: Option<String>,
    instagram: Option<String>,
    twitter: Option<String>,
    entity_email: Option<String>,
    ombudsman_link: Option<String>,
    ombudsman_phone: Option<String>,
    ombudsman_email: Option<String>,
}

pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<SiteSettings> {
        sqlx::query("INSERT OR IGNORE INTO site_settings (id) VALUES (?)")
            .bind(SETTINGS_ROW_ID)
            .execute(self.pool)
            .await
            .context("Failed to seed settings row")?;

        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT entity_name, cnpj, crest_url, primary_color, address, phone, office_hours,
                   official_site, official_gazette, taxpayer_portal, facebook, instagram,
                   twitter, entity_email, ombudsman_link, ombudsman_phone, ombudsman_email
            FROM site_settings WHERE id = ?
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_one(self.pool)
        .await
        .context("Failed to fetch site settings")?;

        Ok(row_to_settings(row))
    }

    pub async fn save(&self, settings: &SiteSettings) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE site_settings SET entity_name = ?, cnpj = ?, crest_url = ?, primary_color = ?,
                address = ?, phone = ?, office_hours = ?, official_site = ?, official_gazette = ?,
                taxpayer_portal = ?, facebook = ?, instagram = ?, twitter = ?, entity_email = ?,
                ombudsman_link = ?, ombudsman_phone = ?, ombudsman_email = ?
            WHERE id = ?
            "#,
        )
        .bind(settings.entity_name.as_deref())
        .bind(settings.cnpj.as_deref())
        .bind(settings.crest_url.as_deref())
        .bind(settings.primary_color.as_deref())
        .bind(settings.address.as_deref())
        .bind(settings.phone.as_deref())
        .bind(settings.office_hours.as_deref())
        .bind(settings.official_site.as_deref())
        .bind(settings.official_gazette.as_deref())
        .bind(settings.taxpayer_portal.as_deref())
        .bind(settings.facebook.as_deref())
        .bind(settings.instagram.as_deref())
        .bind(settings.twitter.as_deref())
        .bind(settings.entity_email.as_deref())
        .bind(settings.ombudsman_link.as_deref())
        .bind(settings.ombudsman_phone.as_deref())
        .bind(settings.ombudsman_email.as_deref())
        .bind(SETTINGS_ROW_ID)
        .execute(self.pool)
        .await
        .context("Failed to save site settings")?;

        Ok(())
    }
}

fn row_to_settings(row: SettingsRow) -> SiteSettings {
    SiteSettings {
        entity_name: row.entity_name,
        cnpj: row.cnpj,
        crest_url: row.crest_url,
        primary_color: row.primary_color,
        address: row.address,
        phone: row.phone,
        office_hours: row.office_hours,
        official_site: row.official_site,
        official_gazette: row.official_gazette,
        taxpayer_portal: row.taxpayer_portal,
        facebook: row.facebook,
        instagram: row.instagram,
        twitter: row.twitter,
        entity_email: row.entity_email,
        ombudsman_link: row.ombudsman_link,
        ombudsman_phone: row.ombudsman_phone,
        ombudsman_email: row.ombudsman_email,
    }
}
