use std::collections::{BTreeMap, HashMap, HashSet};

use lineage_core::{Dataset, ParentRef, Person, PersonId, Sex, build_lineage_graph_report};
use lineage_generate::SimulationConfig;

use crate::metrics::WarningItem;
use crate::model::Violation;

/// Everything found while checking a dataset.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    /// People plus marriages inspected.
    pub records_checked: u64,
    pub violations: Vec<Violation>,
    pub warnings: Vec<WarningItem>,
}

impl CheckOutcome {
    fn violation(&mut self, code: &str, path: String, message: String, person: Option<PersonId>) {
        self.violations
            .push(Violation::new(code, path, message, person));
    }

    fn warning(&mut self, code: &str, path: String, message: String) {
        self.warnings.push(WarningItem {
            code: code.to_string(),
            path,
            message,
            hint: None,
        });
    }

    pub fn violations_by_code(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for violation in &self.violations {
            *counts.entry(violation.code.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Check every genealogical invariant, collecting all findings instead of
/// stopping at the first. Policy limits (marriage age, fertility windows,
/// the pre-cutoff polygamy exemption) come from `config`.
pub fn check_dataset(dataset: &Dataset, config: &SimulationConfig) -> CheckOutcome {
    let mut outcome = CheckOutcome {
        records_checked: (dataset.people.len() + dataset.marriages.len()) as u64,
        ..CheckOutcome::default()
    };

    let mut positions: HashMap<PersonId, usize> = HashMap::new();
    for (position, person) in dataset.people.iter().enumerate() {
        if positions.insert(person.id, position).is_some() {
            outcome.violation(
                "duplicate_id",
                person_path(position),
                format!("duplicate person id {}", person.id),
                Some(person.id),
            );
        }
    }

    let index = dataset.index();
    for (position, person) in dataset.people.iter().enumerate() {
        check_vitals(&mut outcome, position, person);
        check_parent(&mut outcome, config, &index, position, person, Sex::Male);
        check_parent(&mut outcome, config, &index, position, person, Sex::Female);
    }

    check_marriages(&mut outcome, config, dataset, &index);

    if let Some(cycle) = build_lineage_graph_report(dataset).cycle {
        let members = cycle
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        outcome.violation(
            "lineage_cycle",
            "/people".to_string(),
            format!("ancestry cycle through {members}"),
            cycle.first().copied(),
        );
    }

    outcome
}

fn person_path(position: usize) -> String {
    format!("/people/{position}")
}

fn check_vitals(outcome: &mut CheckOutcome, position: usize, person: &Person) {
    let path = person_path(position);
    if person.is_deceased != person.date_of_death.is_some()
        || person.is_deceased != person.cause_of_death.is_some()
    {
        outcome.violation(
            "vitals_mismatch",
            path.clone(),
            "is_deceased, date_of_death and cause_of_death disagree".to_string(),
            Some(person.id),
        );
    }
    if let Some(death) = person.date_of_death
        && death < person.date_of_birth
    {
        outcome.violation(
            "death_before_birth",
            path.clone(),
            format!("died {death} before birth {}", person.date_of_birth),
            Some(person.id),
        );
    }
    if person.maiden_name.is_some() && person.sex != Sex::Female {
        outcome.violation(
            "maiden_name_non_female",
            path,
            "maiden name set on a non-female person".to_string(),
            Some(person.id),
        );
    }
}

fn check_parent(
    outcome: &mut CheckOutcome,
    config: &SimulationConfig,
    index: &HashMap<PersonId, &Person>,
    position: usize,
    person: &Person,
    expected: Sex,
) {
    let (role, link) = match expected {
        Sex::Male => ("father", person.father_id),
        Sex::Female => ("mother", person.mother_id),
    };
    let path = format!("{}/{role}_id", person_path(position));

    let parent = match Dataset::resolve_parent(index, link) {
        ParentRef::Absent => return,
        ParentRef::Dangling(id) => {
            outcome.violation(
                "dangling_parent",
                path,
                format!("{role} {id} does not resolve"),
                Some(person.id),
            );
            return;
        }
        ParentRef::Placeholder(parent) | ParentRef::Known(parent) => parent,
    };

    if parent.id == person.id {
        outcome.violation(
            "self_parent",
            path,
            format!("person is their own {role}"),
            Some(person.id),
        );
        return;
    }
    if parent.sex != expected {
        outcome.violation(
            "parent_sex",
            path.clone(),
            format!("{role} {} has sex {}", parent.id, parent.sex),
            Some(person.id),
        );
    }
    if parent.is_placeholder() {
        return;
    }

    let born = person.birth_year();
    if parent.date_of_birth >= person.date_of_birth {
        outcome.violation(
            "parent_born_after_child",
            path,
            format!("{role} {} born on or after the child", parent.id),
            Some(person.id),
        );
        return;
    }
    if !parent.alive_in(born) {
        outcome.warning(
            "birth_after_parent_death",
            path.clone(),
            format!("{role} {} died before the birth year {born}", parent.id),
        );
    }

    let (start, end) = match expected {
        Sex::Female => (config.fertility_start_age, config.fertility_end_age_female),
        Sex::Male => (config.fertility_start_age, config.fertility_end_age_male),
    };
    let age = parent.age_in(born);
    if age < start || age > end {
        outcome.warning(
            "fertility_window",
            path,
            format!("{role} aged {age} at birth, outside {start}..={end}"),
        );
    }
}

fn check_marriages(
    outcome: &mut CheckOutcome,
    config: &SimulationConfig,
    dataset: &Dataset,
    index: &HashMap<PersonId, &Person>,
) {
    let mut periods: HashMap<PersonId, Vec<(usize, i32, i32)>> = HashMap::new();

    for (position, marriage) in dataset.marriages.iter().enumerate() {
        let path = format!("/marriages/{position}");
        let (Some(first), Some(second)) = (
            index.get(&marriage.person1_id),
            index.get(&marriage.person2_id),
        ) else {
            outcome.violation(
                "marriage_unknown_party",
                path,
                "marriage references an unknown person".to_string(),
                None,
            );
            continue;
        };

        if first.sex == second.sex {
            outcome.violation(
                "same_sex_marriage",
                path.clone(),
                format!("{} and {} share sex {}", first.id, second.id, first.sex),
                Some(first.id),
            );
        }
        for party in [first, second] {
            if party.age_in(marriage.year) < config.marriage_min_age {
                outcome.violation(
                    "underage_marriage",
                    path.clone(),
                    format!(
                        "{} aged {} in {}",
                        party.id,
                        party.age_in(marriage.year),
                        marriage.year
                    ),
                    Some(party.id),
                );
            }
        }
        if marriage.current != marriage.ended_year.is_none() {
            outcome.violation(
                "marriage_state",
                path.clone(),
                "current flag disagrees with ended_year".to_string(),
                Some(first.id),
            );
        }
        if let Some(ended) = marriage.ended_year
            && ended < marriage.year
        {
            outcome.violation(
                "marriage_state",
                path,
                format!("ended {ended} before formed {}", marriage.year),
                Some(first.id),
            );
        }

        let end = marriage.ended_year.unwrap_or(i32::MAX);
        for id in [first.id, second.id] {
            periods
                .entry(id)
                .or_default()
                .push((position, marriage.year, end));
        }
    }

    let mut reported = HashSet::new();
    let mut people: Vec<_> = periods.into_iter().collect();
    people.sort_by_key(|(id, _)| *id);
    for (id, mut spans) in people {
        spans.sort_by_key(|(position, start, _)| (*start, *position));
        let exempt_sex = index.get(&id).map(|person| person.sex) == Some(Sex::Male);
        for (i, earlier) in spans.iter().enumerate() {
            for later in &spans[i + 1..] {
                if later.1 >= earlier.2 {
                    continue;
                }
                let path = format!("/marriages/{}", later.0);
                if exempt_sex && later.1 < config.era_cutoff_year {
                    outcome.warning(
                        "polygamous_marriage",
                        path,
                        format!("{id} married again in {} while still married", later.1),
                    );
                } else if reported.insert((id, later.0)) {
                    outcome.violation(
                        "concurrent_marriage",
                        path,
                        format!("{id} has overlapping marriages from {}", later.1),
                        Some(id),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::Marriage;
    use lineage_generate::{FakeRsAdapter, simulate_dataset};

    fn generated() -> Dataset {
        let config = SimulationConfig {
            families: 3,
            ..SimulationConfig::default()
        };
        simulate_dataset(&config, Box::new(FakeRsAdapter::default()), 17)
            .expect("simulation")
            .0
    }

    fn couple(dataset: &Dataset) -> (PersonId, PersonId) {
        let marriage = &dataset.marriages[0];
        (marriage.person1_id, marriage.person2_id)
    }

    #[test]
    fn generated_dataset_has_no_violations() {
        let dataset = generated();
        let outcome = check_dataset(&dataset, &SimulationConfig::default());
        assert!(outcome.violations.is_empty(), "{:?}", outcome.violations);
        assert_eq!(
            outcome.records_checked,
            (dataset.people.len() + dataset.marriages.len()) as u64
        );
    }

    /// Reopen the first marriage and add a second one for the same couple a
    /// year later, returning (husband, wife, index of the new marriage).
    fn remarry_first_couple(dataset: &mut Dataset) -> (PersonId, PersonId, usize) {
        let (a, b) = couple(dataset);
        let (husband, wife) = {
            let index = dataset.index();
            if index[&a].sex == Sex::Male { (a, b) } else { (b, a) }
        };
        let year = dataset.marriages[0].year;
        dataset.marriages[0].current = true;
        dataset.marriages[0].ended_year = None;
        dataset.marriages.push(Marriage::new(husband, wife, year + 1));
        (husband, wife, dataset.marriages.len() - 1)
    }

    #[test]
    fn reports_every_broken_record() {
        let mut dataset = generated();
        dataset.people[0].is_deceased = !dataset.people[0].is_deceased;
        dataset.people[1].father_id = Some(PersonId::from_bytes([9; 16]));
        let (_, wife, added) = remarry_first_couple(&mut dataset);

        let outcome = check_dataset(&dataset, &SimulationConfig::default());
        let counts = outcome.violations_by_code();
        assert_eq!(counts.get("vitals_mismatch"), Some(&1));
        assert_eq!(counts.get("dangling_parent"), Some(&1));
        assert!(
            outcome
                .violations
                .iter()
                .any(|violation| violation.path == "/people/1/father_id")
        );
        let added_path = format!("/marriages/{added}");
        assert!(outcome.violations.iter().any(|violation| {
            violation.code == "concurrent_marriage"
                && violation.path == added_path
                && violation.person_id == Some(wife)
        }));
    }

    #[test]
    fn pre_cutoff_second_marriage_is_only_a_warning_for_men() {
        let mut dataset = generated();
        let (husband, _, added) = remarry_first_couple(&mut dataset);
        assert!(dataset.marriages[added].year < 1970);

        let outcome = check_dataset(&dataset, &SimulationConfig::default());
        let added_path = format!("/marriages/{added}");
        assert!(!outcome.violations.iter().any(|violation| {
            violation.path == added_path && violation.person_id == Some(husband)
        }));
        assert!(outcome.warnings.iter().any(|warning| {
            warning.code == "polygamous_marriage" && warning.path == added_path
        }));
    }
}
