use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declares a closed categorical domain whose wire labels are fixed strings.
macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            JsonSchema,
        )]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every value of the domain, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical! {
    /// Biological sex. The model is binary.
    Sex {
        Male => "M",
        Female => "F",
    }
}

impl Sex {
    pub fn opposite(self) -> Self {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

categorical! {
    /// ABO/Rh blood group.
    BloodType {
        APos => "A+",
        ANeg => "A-",
        BPos => "B+",
        BNeg => "B-",
        AbPos => "AB+",
        AbNeg => "AB-",
        OPos => "O+",
        ONeg => "O-",
    }
}

/// Approximate global blood group distribution. Weights sum to 1.0.
pub const BLOOD_TYPE_WEIGHTS: &[(BloodType, f64)] = &[
    (BloodType::APos, 0.34),
    (BloodType::ANeg, 0.06),
    (BloodType::BPos, 0.08),
    (BloodType::BNeg, 0.02),
    (BloodType::AbPos, 0.03),
    (BloodType::AbNeg, 0.01),
    (BloodType::OPos, 0.38),
    (BloodType::ONeg, 0.08),
];

categorical! {
    EyeColor {
        Brown => "Brown",
        Blue => "Blue",
        Green => "Green",
        Hazel => "Hazel",
        Grey => "Grey",
        Amber => "Amber",
    }
}

categorical! {
    HairColor {
        Black => "Black",
        Brown => "Brown",
        Blonde => "Blonde",
        Red => "Red",
        Grey => "Grey",
        White => "White",
    }
}

categorical! {
    Nationality {
        American => "American",
        British => "British",
        French => "French",
        German => "German",
        Italian => "Italian",
        Spanish => "Spanish",
        Chinese => "Chinese",
        Indian => "Indian",
        Japanese => "Japanese",
        Nigerian => "Nigerian",
        Brazilian => "Brazilian",
        Mexican => "Mexican",
    }
}

categorical! {
    Ethnicity {
        Caucasian => "Caucasian",
        African => "African",
        Hispanic => "Hispanic",
        Asian => "Asian",
        MiddleEastern => "Middle Eastern",
        Mixed => "Mixed",
    }
}

categorical! {
    Religion {
        Christianity => "Christianity",
        Islam => "Islam",
        Hinduism => "Hinduism",
        Buddhism => "Buddhism",
        Judaism => "Judaism",
        NoReligion => "None",
        Other => "Other",
    }
}

categorical! {
    /// Highest completed education level.
    Education {
        HighSchool => "High School",
        SomeCollege => "Some College",
        Bachelor => "Bachelor's Degree",
        Master => "Master's Degree",
        Doctorate => "Ph.D.",
        TradeSchool => "Trade School",
        NoEducation => "None",
    }
}

categorical! {
    CauseOfDeath {
        NaturalCauses => "Natural causes",
        HeartDisease => "Heart disease",
        Cancer => "Cancer",
        Accident => "Accident",
        RespiratoryDisease => "Respiratory disease",
        Stroke => "Stroke",
        SurgicalComplications => "Complications from surgery",
        Unknown => "Unknown",
        InfectiousDisease => "Infectious disease",
        War => "War/conflict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_type_weights_cover_domain_and_sum_to_one() {
        let total: f64 = BLOOD_TYPE_WEIGHTS.iter().map(|(_, weight)| weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for blood_type in BloodType::ALL {
            assert!(
                BLOOD_TYPE_WEIGHTS
                    .iter()
                    .any(|(candidate, _)| candidate == blood_type)
            );
        }
    }

    #[test]
    fn labels_round_trip_through_parse() {
        for value in Education::ALL {
            assert_eq!(Education::parse(value.as_str()), Some(*value));
        }
        assert_eq!(Sex::parse("F"), Some(Sex::Female));
        assert_eq!(Sex::parse("Other"), None);
        assert_eq!(Religion::NoReligion.as_str(), "None");
    }

    #[test]
    fn serializes_with_wire_labels() {
        let json = serde_json::to_string(&BloodType::AbNeg).expect("serialize");
        assert_eq!(json, "\"AB-\"");
        let parsed: Ethnicity = serde_json::from_str("\"Middle Eastern\"").expect("parse");
        assert_eq!(parsed, Ethnicity::MiddleEastern);
    }
}
