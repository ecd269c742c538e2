use crate::genomics::GeneticConfig;
use crate::Innovation;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Genes are the principal components of genomes.
/// They are created between two nodes, and become
/// network connections in the genome's phenotype.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Gene {
    id: Innovation,
    input: Innovation,
    output: Innovation,
    weight: f32,
    suppressed: bool,
}

impl Gene {
    /// Returns a new _unsuppressed_ gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat_nn::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 0, 1, 2.0);
    /// assert_eq!(gene.endpoints(), (0, 1));
    /// assert!(!gene.suppressed());
    /// ```
    pub fn new(id: Innovation, input: Innovation, output: Innovation, weight: f32) -> Gene {
        Gene {
            id,
            input,
            output,
            weight,
            suppressed: false,
        }
    }

    /// Returns a random weight in `[-weight_bound, weight_bound]`.
    pub(super) fn random_weight<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> f32 {
        if config.weight_bound > 0.0 {
            rng.gen_range(-config.weight_bound..=config.weight_bound)
        } else {
            0.0
        }
    }

    /// Sets the gene's weight to a random value
    /// in `[-weight_bound, weight_bound]`.
    pub fn randomize_weight<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        self.weight = Self::random_weight(config, rng);
    }

    /// Adds a random value in
    /// `[-weight_mutation_power, weight_mutation_power]`
    /// to the gene's weight, keeping it within the weight bound.
    pub fn nudge_weight<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        if config.weight_mutation_power > 0.0 {
            self.weight +=
                rng.gen_range(-config.weight_mutation_power..=config.weight_mutation_power);
        }
        self.weight = self.weight.clamp(-config.weight_bound, config.weight_bound);
    }

    pub fn innovation(&self) -> Innovation {
        self.id
    }

    pub fn input(&self) -> Innovation {
        self.input
    }

    pub fn output(&self) -> Innovation {
        self.output
    }

    /// Returns the gene's input and output nodes.
    pub fn endpoints(&self) -> (Innovation, Innovation) {
        (self.input, self.output)
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, w: f32) {
        self.weight = w;
    }

    /// Returns whether the gene is suppressed, in which
    /// case it isn't expressed in the genome's phenotype.
    pub fn suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn set_suppressed(&mut self, suppression: bool) {
        self.suppressed = suppression;
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:?}[{:?}->{:?}, {:.3}]{}",
            if self.suppressed { "(" } else { "" },
            self.id,
            self.input,
            self.output,
            self.weight,
            if self.suppressed { ")" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pursuit_neat::seeded_rng;

    #[test]
    fn nudge_stays_within_bound() {
        let config = GeneticConfig {
            weight_bound: 1.0,
            weight_mutation_power: 0.75,
            ..GeneticConfig::zero()
        };
        let mut rng = seeded_rng(1);
        let mut gene = Gene::new(0, 0, 1, 0.9);
        for _ in 0..100 {
            let before = gene.weight();
            gene.nudge_weight(&config, &mut rng);
            assert!(gene.weight().abs() <= 1.0);
            assert!((gene.weight() - before).abs() <= 0.75 + f32::EPSILON);
        }
    }

    #[test]
    fn display_marks_suppression() {
        let mut gene = Gene::new(3, 0, 1, 0.5);
        assert_eq!(gene.to_string(), "3[0->1, 0.500]");
        gene.set_suppressed(true);
        assert_eq!(gene.to_string(), "(3[0->1, 0.500])");
    }
}
