use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use lineage_core::{PersonId, Sex, build_lineage_graph_report, validate_dataset};
use lineage_generate::{
    AttributeSynthesizer, FakeRsAdapter, FamilySeed, MortalityModel, Population, Refusal,
    SimulationConfig, SimulationStats, YearStepper, seed_family, seed_population,
    simulate_dataset,
};

fn small_config() -> SimulationConfig {
    SimulationConfig {
        families: 3,
        ..SimulationConfig::default()
    }
}

fn synthesizer(config: &SimulationConfig) -> AttributeSynthesizer {
    AttributeSynthesizer::new(config, Box::new(FakeRsAdapter::default()))
}

fn simulate(config: &SimulationConfig, seed: u64) -> (Population, SimulationStats) {
    let synth = synthesizer(config);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut population = Population::new(config);
    let mut stats = SimulationStats::default();
    seed_population(&mut population, &synth, config, &mut stats, &mut rng);
    YearStepper::new(config, &synth).run(&mut population, &mut stats, &mut rng);
    (population, stats)
}

#[test]
fn founding_family_scenario() {
    let config = SimulationConfig::default();
    let synth = synthesizer(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut population = Population::new(&config);
    let mut stats = SimulationStats::default();

    let seed = FamilySeed {
        patriarch_birth: 1900,
        matriarch_birth: 1902,
        marriage_year: 1920,
        child_years: vec![1921, 1923],
    };
    let family = seed_family(&mut population, &synth, &seed, &mut stats, &mut rng);

    let marriages = population.ledger.marriages();
    assert_eq!(marriages.len(), 1);
    assert!(marriages[0].current);
    assert_eq!(marriages[0].year, 1920);

    let children: Vec<_> = population
        .registry
        .iter()
        .filter(|person| person.father_id == Some(family.patriarch))
        .collect();
    assert_eq!(children.len(), 2);
    for child in &children {
        assert!((1921..=1923).contains(&child.birth_year()));
        assert_eq!(child.mother_id, Some(family.matriarch));
    }

    let matriarch = population.registry.get(family.matriarch).expect("matriarch");
    let patriarch = population.registry.get(family.patriarch).expect("patriarch");
    assert!(matriarch.maiden_name.is_some());
    assert_eq!(matriarch.last_name, patriarch.last_name);
    for founder in [patriarch, matriarch] {
        assert!(founder.is_deceased);
        let death_year = founder.date_of_death.expect("death date").year();
        assert!(death_year >= founder.birth_year() + 75);
        assert!(death_year <= founder.birth_year() + 100);
    }
}

#[test]
fn birth_in_1850_dies_between_1925_and_1950() {
    let model = MortalityModel::new(&SimulationConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let vitals = model.evaluate(1850, None, &mut rng);
    assert!(vitals.is_deceased);
    let year = vitals.date_of_death.expect("death date").year();
    assert!((1925..=1950).contains(&year));
}

#[test]
fn mother_aged_fifty_is_refused() {
    let config = SimulationConfig::default();
    let synth = synthesizer(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut population = Population::new(&config);

    let mother = population.add_person(
        &synth,
        lineage_generate::PersonSpec::born(1930)
            .sex(Sex::Female)
            .forced_deceased(false),
        &mut rng,
    );
    let result = population.ledger.register_child(
        &mut population.registry,
        &synth,
        None,
        mother,
        1980,
        &mut rng,
    );
    assert_eq!(result, Err(Refusal::MotherOutsideFertility(mother)));
}

#[test]
fn simulated_population_keeps_its_invariants() {
    let config = small_config();
    for seed in [7_u64, 8, 9] {
        let (population, stats) = simulate(&config, seed);
        assert_eq!(stats.years_simulated, 105);
        assert_eq!(stats.founders, 6);

        let mut derived: BTreeMap<PersonId, Vec<PersonId>> = BTreeMap::new();
        for person in population.registry.iter() {
            for parent in [person.father_id, person.mother_id].into_iter().flatten() {
                derived.entry(parent).or_default().push(person.id);
            }
        }
        let indexed: BTreeMap<PersonId, Vec<PersonId>> = population
            .ledger
            .children_index()
            .iter()
            .map(|(parent, children)| (*parent, children.clone()))
            .collect();
        assert_eq!(derived, indexed, "children index drifted for seed {seed}");

        let dataset = population.into_dataset();
        validate_dataset(&dataset).expect("dataset invariants");

        for person in &dataset.people {
            assert_eq!(person.is_deceased, person.date_of_death.is_some());
            assert_eq!(person.is_deceased, person.cause_of_death.is_some());
            if person.maiden_name.is_some() {
                assert_eq!(person.sex, Sex::Female);
            }
        }

        let graph = build_lineage_graph_report(&dataset);
        assert!(graph.cycle.is_none());
        assert!(graph.generations.unwrap_or(0) >= 2);
    }
}

#[test]
fn no_concurrent_marriages_without_polygamy() {
    let config = SimulationConfig {
        families: 4,
        polygamy_probability: 0.0,
        ..SimulationConfig::default()
    };
    let (population, _) = simulate(&config, 11);
    let dataset = population.into_dataset();

    let mut spans: HashMap<PersonId, Vec<(i32, i32)>> = HashMap::new();
    for marriage in &dataset.marriages {
        let span = (marriage.year, marriage.ended_year.unwrap_or(i32::MAX));
        spans.entry(marriage.person1_id).or_default().push(span);
        spans.entry(marriage.person2_id).or_default().push(span);
    }

    for (person, mut periods) in spans {
        periods.sort();
        for pair in periods.windows(2) {
            assert!(
                pair[0].1 <= pair[1].0,
                "{person} has overlapping marriages {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn same_seed_same_dataset() {
    let config = small_config();
    let (first, _) = simulate_dataset(&config, Box::new(FakeRsAdapter::default()), 42)
        .expect("first run");
    let (second, _) = simulate_dataset(&config, Box::new(FakeRsAdapter::default()), 42)
        .expect("second run");
    let (other, _) = simulate_dataset(&config, Box::new(FakeRsAdapter::default()), 43)
        .expect("other run");

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).expect("encode"),
        serde_json::to_vec(&second).expect("encode")
    );
    assert_ne!(first, other);
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimulationConfig {
        present_year: 1910,
        ..SimulationConfig::default()
    };
    let result = simulate_dataset(&config, Box::new(FakeRsAdapter::default()), 1);
    assert!(result.is_err());

    let teenage_marriages = SimulationConfig {
        families: 3,
        marriage_min_age: 16,
        ..SimulationConfig::default()
    };
    let result = simulate_dataset(&teenage_marriages, Box::new(FakeRsAdapter::default()), 1);
    assert!(matches!(
        result,
        Err(lineage_generate::GenerationError::InvalidConfig(_))
    ));
}
