use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::person::PersonId;

/// Summary of lineage graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageGraphSummary {
    pub nodes: usize,
    /// Parent to child links.
    pub edges: usize,
    /// People without any recorded parent.
    pub roots: usize,
}

/// Report on the parent/child graph of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageGraphReport {
    pub summary: LineageGraphSummary,
    /// Number of generations on the longest ancestor chain (roots count as 1).
    pub generations: Option<u32>,
    /// People per generation number, when the graph is acyclic.
    pub generation_sizes: BTreeMap<u32, usize>,
    /// People left unordered by the topological sort (ancestry cycles).
    pub cycle: Option<Vec<PersonId>>,
}

/// Build a deterministic lineage report for a dataset.
pub fn build_lineage_graph_report(dataset: &Dataset) -> LineageGraphReport {
    let graph = build_adjacency(dataset);
    let nodes = graph.len();
    let edges = graph.values().map(|children| children.len()).sum();
    let roots = dataset
        .people
        .iter()
        .filter(|person| person.father_id.is_none() && person.mother_id.is_none())
        .count();
    let summary = LineageGraphSummary {
        nodes,
        edges,
        roots,
    };

    match toposort(&graph) {
        Ok(order) => {
            let depth = generation_depths(&graph, &order);
            let mut generation_sizes = BTreeMap::new();
            for generation in depth.values() {
                *generation_sizes.entry(*generation).or_insert(0) += 1;
            }
            LineageGraphReport {
                summary,
                generations: depth.values().copied().max(),
                generation_sizes,
                cycle: None,
            }
        }
        Err(cycle) => LineageGraphReport {
            summary,
            generations: None,
            generation_sizes: BTreeMap::new(),
            cycle: Some(cycle),
        },
    }
}

fn build_adjacency(dataset: &Dataset) -> BTreeMap<PersonId, BTreeSet<PersonId>> {
    let mut graph: BTreeMap<PersonId, BTreeSet<PersonId>> = BTreeMap::new();

    for person in &dataset.people {
        graph.entry(person.id).or_default();
        for parent in [person.father_id, person.mother_id].into_iter().flatten() {
            graph.entry(parent).or_default().insert(person.id);
        }
    }

    graph
}

fn toposort(graph: &BTreeMap<PersonId, BTreeSet<PersonId>>) -> Result<Vec<PersonId>, Vec<PersonId>> {
    let mut indegree: BTreeMap<PersonId, usize> = graph.keys().map(|node| (*node, 0)).collect();

    for children in graph.values() {
        for child in children {
            *indegree.entry(*child).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<PersonId> = indegree
        .iter()
        .filter_map(|(node, count)| (*count == 0).then_some(*node))
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(children) = graph.get(&node) {
            for child in children {
                if let Some(count) = indegree.get_mut(child) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*child);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(indegree
            .into_iter()
            .filter_map(|(node, count)| (count > 0).then_some(node))
            .collect())
    }
}

fn generation_depths(
    graph: &BTreeMap<PersonId, BTreeSet<PersonId>>,
    order: &[PersonId],
) -> BTreeMap<PersonId, u32> {
    let mut depth: BTreeMap<PersonId, u32> = BTreeMap::new();
    for node in order {
        let current = *depth.entry(*node).or_insert(1);
        if let Some(children) = graph.get(node) {
            for child in children {
                let entry = depth.entry(*child).or_insert(1);
                *entry = (*entry).max(current + 1);
            }
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::Person;

    fn people(count: u8) -> Vec<Person> {
        let template: Person = serde_json::from_value(serde_json::json!({
            "id": "00000000-0000-4000-8000-000000000000",
            "first_name": "A",
            "middle_name": null,
            "last_name": "B",
            "maiden_name": null,
            "date_of_birth": "1900-01-01",
            "sex": "M",
            "blood_type": "O+",
            "nationality": "German",
            "ethnicity": "Caucasian",
            "place_of_birth": "Bonn, Germany",
            "date_of_death": null,
            "is_deceased": false,
            "cause_of_death": null,
            "height_cm": 180,
            "eye_color": "Blue",
            "hair_color": "Blonde",
            "email": null,
            "phone": null,
            "address": null,
            "occupation": null,
            "education": null,
            "religion": "None",
            "notes": null,
            "legacy_bucket_id": null,
            "father_id": null,
            "mother_id": null
        }))
        .expect("template person");

        (1..=count)
            .map(|byte| Person {
                id: PersonId::from_bytes([byte; 16]),
                ..template.clone()
            })
            .collect()
    }

    #[test]
    fn counts_generations_along_longest_chain() {
        let mut people = people(4);
        let grandfather = people[0].id;
        let father = people[1].id;
        people[1].father_id = Some(grandfather);
        people[2].father_id = Some(father);
        people[3].father_id = Some(grandfather);

        let report = build_lineage_graph_report(&Dataset {
            people,
            marriages: Vec::new(),
        });
        assert!(report.cycle.is_none());
        assert_eq!(report.generations, Some(3));
        assert_eq!(report.summary.edges, 3);
        assert_eq!(report.summary.roots, 1);
        assert_eq!(report.generation_sizes.get(&2), Some(&2));
        assert_eq!(report.generation_sizes.get(&3), Some(&1));
    }

    #[test]
    fn reports_ancestry_cycle() {
        let mut people = people(2);
        let first = people[0].id;
        let second = people[1].id;
        people[0].father_id = Some(second);
        people[1].father_id = Some(first);

        let report = build_lineage_graph_report(&Dataset {
            people,
            marriages: Vec::new(),
        });
        assert!(report.generations.is_none());
        let cycle = report.cycle.expect("cycle expected");
        assert!(cycle.contains(&first) && cycle.contains(&second));
    }
}
