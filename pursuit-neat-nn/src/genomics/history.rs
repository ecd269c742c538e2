use crate::genomics::GeneticConfig;
use crate::Innovation;

use ahash::RandomState;
use pursuit_neat::InnovationHistory;
use serde::{Deserialize, Serialize};

use std::collections::hash_map::{Entry, HashMap};

/// A `History` keeps track of gene and node innovations in a
/// population, so that identical mutations in different
/// genomes are assigned the same innovation numbers.
///
/// Gene innovations are identified by their input and output
/// nodes. Node innovations are identified by the gene they split,
/// and record the innovation numbers of the new input gene, new
/// node, and new output gene, in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    next_gene_innovation: Innovation,
    next_node_innovation: Innovation,
    gene_innovations: HashMap<(Innovation, Innovation), Innovation, RandomState>,
    gene_endpoints: Vec<(Innovation, Innovation)>,
    node_innovations: HashMap<Innovation, (Innovation, Innovation, Innovation), RandomState>,
}

impl InnovationHistory for History {
    type Config = GeneticConfig;

    fn new(config: &GeneticConfig) -> History {
        Self::new(config)
    }
}

impl History {
    /// Creates a new History using the specified configuration.
    ///
    /// Initially generated genes are given the innovation number
    /// `o + i ⨯ output_count`, where `i` is the index of their
    /// input node and `o` is the index of their output node.
    /// Genes created through mutation start at
    /// `input_count ⨯ output_count`.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat_nn::genomics::{GeneticConfig, History};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// let history = History::new(&config);
    ///
    /// assert_eq!(history.max_gene_innovation(), 5);
    /// assert_eq!(history.max_node_innovation(), 4);
    /// ```
    pub fn new(config: &GeneticConfig) -> History {
        let input_count = config.input_count.get();
        let output_count = config.output_count.get();
        let (gene_innovations, gene_endpoints) = (0..input_count)
            .flat_map(|i| (0..output_count).map(move |o| (i, o)))
            .map(|(i, o)| {
                let endpoints = (i, o + input_count);
                ((endpoints, o + i * output_count), endpoints)
            })
            .unzip();
        History {
            next_gene_innovation: input_count * output_count,
            next_node_innovation: input_count + output_count,
            gene_innovations,
            gene_endpoints,
            node_innovations: HashMap::default(),
        }
    }

    /// Returns the next gene innovation number, or the
    /// number previously assigned to the same gene mutation.
    pub(crate) fn next_gene_innovation(&self, input_id: Innovation, output_id: Innovation) -> Innovation {
        *self
            .gene_innovations
            .get(&(input_id, output_id))
            .unwrap_or(&self.next_gene_innovation)
    }

    /// Returns the innovation numbers for splitting `split_gene`,
    /// as `(input gene, new node, output gene)`: either the ones
    /// previously assigned to the same node mutation or fresh ones.
    ///
    /// `duplicate` forces fresh numbers. It is set when the
    /// mutating genome already contains the previously
    /// assigned node, having split the same gene before.
    pub(crate) fn next_node_innovation(
        &self,
        split_gene: Innovation,
        duplicate: bool,
    ) -> (Innovation, Innovation, Innovation) {
        match self.node_innovations.get(&split_gene) {
            Some(record) if !duplicate => *record,
            _ => (
                self.next_gene_innovation,
                self.next_node_innovation,
                self.next_gene_innovation + 1,
            ),
        }
    }

    /// Records a gene mutation, if it is new.
    pub(crate) fn add_gene_innovation(&mut self, input_id: Innovation, output_id: Innovation) {
        if let Entry::Vacant(entry) = self.gene_innovations.entry((input_id, output_id)) {
            entry.insert(self.next_gene_innovation);
            self.gene_endpoints.push((input_id, output_id));
            self.next_gene_innovation += 1;
        }
    }

    /// Records a node mutation, if it is new or `duplicate` is set.
    /// A duplicate record replaces the previous one for `split_gene`.
    pub(crate) fn add_node_innovation(&mut self, split_gene: Innovation, duplicate: bool) {
        if !self.node_innovations.contains_key(&split_gene) || duplicate {
            let (split_input, split_output) = self.gene_endpoints[split_gene];
            let new_node = self.next_node_innovation;

            let new_input_gene = self.next_gene_innovation;
            self.push_gene_innovation(split_input, new_node);
            let new_output_gene = self.next_gene_innovation;
            self.push_gene_innovation(new_node, split_output);

            self.node_innovations
                .insert(split_gene, (new_input_gene, new_node, new_output_gene));
            self.next_node_innovation += 1;
        }
    }

    /// Records a gene innovation unconditionally. The new node
    /// has no prior genes, so its endpoints are always fresh.
    fn push_gene_innovation(&mut self, input_id: Innovation, output_id: Innovation) {
        self.gene_innovations
            .insert((input_id, output_id), self.next_gene_innovation);
        self.gene_endpoints.push((input_id, output_id));
        self.next_gene_innovation += 1;
    }

    /// Returns the highest gene innovation number generated.
    pub fn max_gene_innovation(&self) -> Innovation {
        self.next_gene_innovation.saturating_sub(1)
    }

    /// Returns the highest node innovation number generated.
    pub fn max_node_innovation(&self) -> Innovation {
        self.next_node_innovation.saturating_sub(1)
    }

    /// Returns an iterator over the complete record of
    /// gene innovations, in the format
    /// `((input node, output node), gene innovation)`.
    /// No ordering is guaranteed.
    pub fn gene_innovation_history(
        &self,
    ) -> impl Iterator<Item = (&(Innovation, Innovation), &Innovation)> {
        self.gene_innovations.iter()
    }

    /// Returns an iterator over the complete record of
    /// node innovations, in the format
    /// `(split gene, (input gene, new node, output gene))`.
    /// No ordering is guaranteed.
    pub fn node_innovation_history(
        &self,
    ) -> impl Iterator<Item = (&Innovation, &(Innovation, Innovation, Innovation))> {
        self.node_innovations.iter()
    }
}
