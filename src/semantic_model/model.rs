//! The semantic model - the immutable registry bundle
//!
//! A `SemanticModel` holds every attribute, measure, metric, and named
//! context transform a query can reference. It is constructed in one shot by
//! `SemanticModelBuilder::build`, which validates name uniqueness and rejects
//! cyclic metric dependencies, and is read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use super::attribute::Attribute;
use super::measure::Measure;
use super::metric::Metric;
use crate::context::FilterContext;
use crate::transform::{self, ContextTransformFn};

/// The registry bundle: attributes, measures, metrics, and named transforms
///
/// Immutable after construction; safe to share across query invocations.
pub struct SemanticModel {
    attributes: Vec<Attribute>,
    measures: Vec<Measure>,
    metrics: Vec<Metric>,
    transforms: HashMap<String, ContextTransformFn>,
}

impl SemanticModel {
    /// Start building a model. The `ytd` and `last_year` transforms are
    /// pre-registered.
    pub fn builder() -> SemanticModelBuilder {
        SemanticModelBuilder::new()
    }

    /// Get an attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get a measure by name
    pub fn get_measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    /// Get a metric by name
    pub fn get_metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Get a named context transform
    pub fn get_transform(&self, name: &str) -> Option<&ContextTransformFn> {
        self.transforms.get(name)
    }

    /// All metric names in registration order
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }
}

impl fmt::Debug for SemanticModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticModel")
            .field("attributes", &self.attributes)
            .field("measures", &self.measures)
            .field("metrics", &self.metrics)
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Errors detected while building a semantic model
#[derive(Debug)]
pub enum ModelError {
    DuplicateAttribute(String),
    DuplicateMeasure(String),
    DuplicateMetric(String),
    DuplicateTransform(String),
    /// The Derived/ContextTransform dependency graph contains a cycle
    /// reachable from the named metric
    CyclicMetric(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::DuplicateAttribute(name) => {
                write!(f, "Attribute '{}' is defined more than once", name)
            }
            ModelError::DuplicateMeasure(name) => {
                write!(f, "Measure '{}' is defined more than once", name)
            }
            ModelError::DuplicateMetric(name) => {
                write!(f, "Metric '{}' is defined more than once", name)
            }
            ModelError::DuplicateTransform(name) => {
                write!(f, "Transform '{}' is registered more than once", name)
            }
            ModelError::CyclicMetric(name) => {
                write!(f, "Metric '{}' participates in a dependency cycle", name)
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Builder producing a validated, immutable `SemanticModel`
pub struct SemanticModelBuilder {
    attributes: Vec<Attribute>,
    measures: Vec<Measure>,
    metrics: Vec<Metric>,
    transforms: HashMap<String, ContextTransformFn>,
    duplicate_transform: Option<String>,
}

impl SemanticModelBuilder {
    pub fn new() -> Self {
        let mut transforms: HashMap<String, ContextTransformFn> = HashMap::new();
        transforms.insert("ytd".to_string(), transform::ytd());
        transforms.insert("last_year".to_string(), transform::last_year());
        SemanticModelBuilder {
            attributes: Vec::new(),
            measures: Vec::new(),
            metrics: Vec::new(),
            transforms,
            duplicate_transform: None,
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Register a named context transform
    pub fn transform<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FilterContext) -> FilterContext + Send + Sync + 'static,
    {
        self.add_transform(name, std::sync::Arc::new(f));
        self
    }

    /// Register an already-built transform function (e.g. from the
    /// parameterized constructors or `compose`)
    pub fn transform_fn(mut self, name: impl Into<String>, f: ContextTransformFn) -> Self {
        self.add_transform(name, f);
        self
    }

    fn add_transform(&mut self, name: impl Into<String>, f: ContextTransformFn) {
        let name = name.into();
        // Duplicates are caught in build(); remember the name so the check
        // sees user registrations alongside the built-ins.
        if self.transforms.insert(name.clone(), f).is_some() {
            self.duplicate_transform = Some(name);
        }
    }

    /// Validate and produce the immutable model
    pub fn build(self) -> Result<SemanticModel, ModelError> {
        if let Some(name) = self.duplicate_transform {
            return Err(ModelError::DuplicateTransform(name));
        }
        check_unique(self.attributes.iter().map(|a| a.name.as_str()))
            .map_err(|name| ModelError::DuplicateAttribute(name.to_string()))?;
        check_unique(self.measures.iter().map(|m| m.name.as_str()))
            .map_err(|name| ModelError::DuplicateMeasure(name.to_string()))?;
        check_unique(self.metrics.iter().map(|m| m.name.as_str()))
            .map_err(|name| ModelError::DuplicateMetric(name.to_string()))?;
        check_acyclic(&self.metrics)?;

        Ok(SemanticModel {
            attributes: self.attributes,
            measures: self.measures,
            metrics: self.metrics,
            transforms: self.transforms,
        })
    }
}

impl Default for SemanticModelBuilder {
    fn default() -> Self {
        SemanticModelBuilder::new()
    }
}

/// Find the first name appearing twice
fn check_unique<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), &'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if seen.contains(&name) {
            return Err(name);
        }
        seen.push(name);
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Reject cycles in the Derived/ContextTransform dependency graph.
///
/// Depth-first walk with tricolor marking. Dependency names not present in
/// the registry are ignored here; they surface as `UnknownMetric` when
/// evaluated, per the error taxonomy.
fn check_acyclic(metrics: &[Metric]) -> Result<(), ModelError> {
    let index: HashMap<&str, usize> = metrics
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.as_str(), i))
        .collect();
    let mut marks = vec![Mark::Unvisited; metrics.len()];

    fn visit(
        i: usize,
        metrics: &[Metric],
        index: &HashMap<&str, usize>,
        marks: &mut [Mark],
    ) -> Result<(), ModelError> {
        match marks[i] {
            Mark::Done => return Ok(()),
            Mark::InProgress => return Err(ModelError::CyclicMetric(metrics[i].name.clone())),
            Mark::Unvisited => {}
        }
        marks[i] = Mark::InProgress;
        for dep in metrics[i].dependency_names() {
            if let Some(&j) = index.get(dep) {
                visit(j, metrics, index, marks)?;
            }
        }
        marks[i] = Mark::Done;
        Ok(())
    }

    for i in 0..metrics.len() {
        visit(i, metrics, &index, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_model::{Aggregation, Measure, Metric};

    #[test]
    fn test_build_empty_model() {
        let model = SemanticModel::builder().build().unwrap();
        assert!(model.get_metric("anything").is_none());
        // Built-in transforms are pre-registered
        assert!(model.get_transform("ytd").is_some());
        assert!(model.get_transform("last_year").is_some());
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let err = SemanticModel::builder()
            .metric(Metric::simple("sales", "amount"))
            .metric(Metric::simple("sales", "amount"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateMetric(name) if name == "sales"));
    }

    #[test]
    fn test_duplicate_measure_rejected() {
        let err = SemanticModel::builder()
            .measure(Measure::new("amount", "sales", Aggregation::Sum))
            .measure(Measure::new("amount", "sales", Aggregation::Avg))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateMeasure(_)));
    }

    #[test]
    fn test_cyclic_derived_metrics_rejected() {
        let err = SemanticModel::builder()
            .metric(Metric::derived("a", ["b"], |_| None))
            .metric(Metric::derived("b", ["a"], |_| None))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::CyclicMetric(_)));
    }

    #[test]
    fn test_self_cycle_rejected() {
        let err = SemanticModel::builder()
            .metric(Metric::transformed("a", "a", "ytd"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::CyclicMetric(name) if name == "a"));
    }

    #[test]
    fn test_diamond_dependencies_allowed() {
        // a depends on b and c, both of which depend on d: a DAG, not a cycle
        let model = SemanticModel::builder()
            .metric(Metric::simple("d", "amount"))
            .metric(Metric::derived("b", ["d"], |_| None))
            .metric(Metric::derived("c", ["d"], |_| None))
            .metric(Metric::derived("a", ["b", "c"], |_| None))
            .build()
            .unwrap();
        assert_eq!(model.metric_names().len(), 4);
    }

    #[test]
    fn test_unknown_dependency_not_a_build_error() {
        // Missing names are an evaluation-time error, not a build-time one
        let model = SemanticModel::builder()
            .metric(Metric::derived("a", ["missing"], |_| None))
            .build()
            .unwrap();
        assert!(model.get_metric("a").is_some());
    }
}
