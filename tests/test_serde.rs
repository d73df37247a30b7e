#![cfg(feature = "serde")]

use generational_ga::{
    alteration::Mutation,
    evolution::EvolutionOptions,
    genetics::{Chromosome, DoubleChromosome, DoubleGene, Genotype, PermutationChromosome},
    optimize::Optimize,
    rng::RandomNumberGenerator,
    selection::TournamentSelector,
};

#[test]
fn test_evolution_options_from_json() {
    let options = EvolutionOptions::builder()
        .population_size(120)
        .offspring_fraction(0.4)
        .seed(17)
        .build()
        .unwrap();

    let json = serde_json::to_string(&options).unwrap();
    let restored: EvolutionOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, options);
    assert_eq!(restored.get_population_size(), 120);
    assert_eq!(restored.get_seed(), Some(17));
}

#[test]
fn test_operators_serialize() {
    let json = serde_json::to_string(&Optimize::Minimum).unwrap();
    assert_eq!(json, "\"Minimum\"");

    let selector = TournamentSelector::new(5).unwrap();
    let json = serde_json::to_string(&selector).unwrap();
    assert_eq!(json, r#"{"tournament_size":5}"#);
    let restored: TournamentSelector = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, selector);

    let mutation: Mutation = serde_json::from_str(r#"{"probability":0.25}"#).unwrap();
    assert_eq!(mutation.probability(), 0.25);
}

#[test]
fn test_genotypes_survive_serialization() {
    let mut rng = RandomNumberGenerator::from_seed(3);

    let gene = DoubleGene::new(0.5, 0.0, 1.0).unwrap();
    let json = serde_json::to_string(&gene).unwrap();
    assert_eq!(serde_json::from_str::<DoubleGene>(&json).unwrap(), gene);

    let doubles = Genotype::of(DoubleChromosome::random(-2.0, 2.0, 6, &mut rng).unwrap());
    let json = serde_json::to_string(&doubles).unwrap();
    let restored: Genotype<DoubleChromosome> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, doubles);
    assert!(restored.is_valid());

    let permutation = Genotype::of(PermutationChromosome::random(9, &mut rng).unwrap());
    let json = serde_json::to_string(&permutation).unwrap();
    let restored: Genotype<PermutationChromosome> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, permutation);
}

#[test]
fn test_deserialization_rejects_invalid_values() {
    assert!(serde_json::from_str::<Genotype<DoubleChromosome>>(r#"{"chromosomes":[]}"#).is_err());
    assert!(serde_json::from_str::<DoubleGene>(r#"{"value":0.5,"min":2.0,"max":1.0}"#).is_err());
    assert!(serde_json::from_str::<DoubleChromosome>(r#"{"genes":[]}"#).is_err());

    let mismatched = r#"{"genes":[{"index":0,"bound":2},{"index":1,"bound":3}]}"#;
    assert!(serde_json::from_str::<PermutationChromosome>(mismatched).is_err());
    let zero_bound = r#"{"genes":[{"index":0,"bound":0}]}"#;
    assert!(serde_json::from_str::<PermutationChromosome>(zero_bound).is_err());

    let valid = r#"{"genes":[{"index":1,"bound":2},{"index":0,"bound":2}]}"#;
    let chromosome: PermutationChromosome = serde_json::from_str(valid).unwrap();
    assert_eq!(chromosome.len(), 2);
}
