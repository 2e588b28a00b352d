use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use invoiceai_core::{DomainError, DomainResult, OwnerId, ProfileId};

use crate::invoice::DEFAULT_TAX_PERCENT;

/// Image assets a business profile can carry on its invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Logo,
    Stamp,
    Signature,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Logo => "logo",
            AssetKind::Stamp => "stamp",
            AssetKind::Signature => "signature",
        }
    }
}

impl core::str::FromStr for AssetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "logo" => Ok(Self::Logo),
            "stamp" => Ok(Self::Stamp),
            "signature" => Ok(Self::Signature),
            _ => Err(DomainError::validation(
                "asset kind must be one of: logo, stamp, signature",
            )),
        }
    }
}

/// Client-supplied profile fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileInput {
    pub business_name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub gst: String,
    pub default_tax_percent: Option<f64>,
}

/// The issuing business of one user; pre-fills the `from*` invoice fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub id: ProfileId,
    pub owner_id: OwnerId,
    pub business_name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub gst: String,
    pub logo_url: Option<String>,
    pub stamp_url: Option<String>,
    pub signature_url: Option<String>,
    pub default_tax_percent: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessProfile {
    pub fn create(owner_id: OwnerId, input: ProfileInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let profile = Self {
            id: ProfileId::new(),
            owner_id,
            business_name: input.business_name.trim().to_string(),
            email: input.email,
            address: input.address,
            phone: input.phone,
            gst: input.gst,
            logo_url: None,
            stamp_url: None,
            signature_url: None,
            default_tax_percent: input.default_tax_percent.unwrap_or(DEFAULT_TAX_PERCENT),
            created_at: now,
            updated_at: now,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Replace the text fields; asset URLs are untouched.
    pub fn apply(&mut self, input: ProfileInput, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.business_name = input.business_name.trim().to_string();
        next.email = input.email;
        next.address = input.address;
        next.phone = input.phone;
        next.gst = input.gst;
        if let Some(t) = input.default_tax_percent {
            next.default_tax_percent = t;
        }
        next.updated_at = now;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Point an asset at a new URL, returning the URL it replaced.
    pub fn set_asset(&mut self, kind: AssetKind, url: String, now: DateTime<Utc>) -> Option<String> {
        self.updated_at = now;
        let slot = match kind {
            AssetKind::Logo => &mut self.logo_url,
            AssetKind::Stamp => &mut self.stamp_url,
            AssetKind::Signature => &mut self.signature_url,
        };
        slot.replace(url)
    }

    fn validate(&self) -> DomainResult<()> {
        if self.business_name.is_empty() {
            return Err(DomainError::validation("businessName is required"));
        }
        if !(0.0..=100.0).contains(&self.default_tax_percent) {
            return Err(DomainError::validation(
                "defaultTaxPercent must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> ProfileInput {
        ProfileInput {
            business_name: name.into(),
            email: "billing@acme.test".into(),
            ..Default::default()
        }
    }

    fn owner() -> OwnerId {
        OwnerId::new("user_1").unwrap()
    }

    #[test]
    fn create_requires_business_name() {
        assert!(BusinessProfile::create(owner(), input("  "), Utc::now()).is_err());

        let p = BusinessProfile::create(owner(), input(" Acme "), Utc::now()).unwrap();
        assert_eq!(p.business_name, "Acme");
        assert_eq!(p.default_tax_percent, DEFAULT_TAX_PERCENT);
    }

    #[test]
    fn apply_keeps_assets() {
        let now = Utc::now();
        let mut p = BusinessProfile::create(owner(), input("Acme"), now).unwrap();
        p.set_asset(AssetKind::Logo, "/uploads/a.png".into(), now);

        p.apply(input("Acme Ltd"), now).unwrap();
        assert_eq!(p.business_name, "Acme Ltd");
        assert_eq!(p.logo_url.as_deref(), Some("/uploads/a.png"));
    }

    #[test]
    fn set_asset_returns_previous_url() {
        let now = Utc::now();
        let mut p = BusinessProfile::create(owner(), input("Acme"), now).unwrap();
        assert_eq!(p.set_asset(AssetKind::Stamp, "/uploads/1.png".into(), now), None);
        assert_eq!(
            p.set_asset(AssetKind::Stamp, "/uploads/2.png".into(), now).as_deref(),
            Some("/uploads/1.png")
        );
    }

    #[test]
    fn asset_kind_parses() {
        assert_eq!("Signature".parse::<AssetKind>().unwrap(), AssetKind::Signature);
        assert!("banner".parse::<AssetKind>().is_err());
    }
}
