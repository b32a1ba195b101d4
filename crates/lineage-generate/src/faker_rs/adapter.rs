use fake::Fake;
use fake::faker::address::raw::{
    BuildingNumber, CityName, CountryName, StateAbbr, StreetName, ZipCode,
};
use fake::faker::internet::raw::FreeEmailProvider;
use fake::faker::job::raw::Title;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::{EN, PT_BR};
use rand::RngCore;
use rand::seq::IndexedRandom;

use lineage_core::Sex;

use crate::errors::GenerationError;
use crate::faker_rs::locales::LocaleKey;
use crate::faker_rs::names;

/// Kinds of free text the synthesizer asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakerCategory {
    /// Given name; gendered when a sex is supplied.
    GivenName,
    FamilyName,
    City,
    Country,
    StreetAddress,
    JobTitle,
    EmailDomain,
}

/// Opaque source of plausible strings.
pub trait FakerSource {
    fn text(&self, category: FakerCategory, sex: Option<Sex>, rng: &mut dyn RngCore) -> String;
}

macro_rules! localized {
    ($locale:expr, $faker:ident, $rng:expr) => {{
        let value: String = match $locale {
            LocaleKey::EnUs => $faker(EN).fake_with_rng($rng),
            LocaleKey::PtBr => $faker(PT_BR).fake_with_rng($rng),
        };
        value
    }};
}

/// [`FakerSource`] backed by `fake` locale data.
#[derive(Clone, Copy, Debug, Default)]
pub struct FakeRsAdapter {
    locale: LocaleKey,
}

impl FakeRsAdapter {
    pub fn new(locale: LocaleKey) -> Self {
        Self { locale }
    }

    pub fn for_locale(locale: &str) -> Result<Self, GenerationError> {
        LocaleKey::parse(locale)
            .map(Self::new)
            .ok_or_else(|| GenerationError::UnsupportedLocale(locale.to_string()))
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }
}

impl FakerSource for FakeRsAdapter {
    fn text(&self, category: FakerCategory, sex: Option<Sex>, rng: &mut dyn RngCore) -> String {
        match category {
            FakerCategory::GivenName => match sex {
                Some(sex) => names::first_names(self.locale, sex)
                    .choose(&mut *rng)
                    .map(|name| (*name).to_string())
                    .unwrap_or_else(|| localized!(self.locale, FirstName, &mut *rng)),
                None => localized!(self.locale, FirstName, &mut *rng),
            },
            FakerCategory::FamilyName => localized!(self.locale, LastName, &mut *rng),
            FakerCategory::City => localized!(self.locale, CityName, &mut *rng),
            FakerCategory::Country => localized!(self.locale, CountryName, &mut *rng),
            FakerCategory::StreetAddress => {
                let number = localized!(self.locale, BuildingNumber, &mut *rng);
                let street = localized!(self.locale, StreetName, &mut *rng);
                let city = localized!(self.locale, CityName, &mut *rng);
                let state = localized!(self.locale, StateAbbr, &mut *rng);
                let zip = localized!(self.locale, ZipCode, &mut *rng);
                format!("{number} {street}, {city}, {state} {zip}")
            }
            FakerCategory::JobTitle => localized!(self.locale, Title, &mut *rng),
            FakerCategory::EmailDomain => localized!(self.locale, FreeEmailProvider, &mut *rng),
        }
    }
}
