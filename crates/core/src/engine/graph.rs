//! The built-in function graph.
//!
//! Nodes are named functions with declared dependencies. A dependency that
//! no active node produces is a leaf and must be bound by the execution
//! inputs. Nodes may be gated on a configuration value with [`Node::when`],
//! which lets several variants of the same node coexist in a module while
//! exactly one is active for a given configuration.

use crate::config::models::lookup;
use crate::config::ValueMap;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::{Engine, ExecutionReport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

type NodeFn = dyn Fn(&NodeInputs) -> anyhow::Result<Value> + Send + Sync;

/// A named transformation function.
#[derive(Clone)]
pub struct Node {
    name: String,
    dependencies: Vec<String>,
    func: Arc<NodeFn>,
    conditions: Vec<(String, Value)>,
    doc: Option<String>,
}

impl Node {
    /// Create a node computing `name` from `dependencies`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dc_core::engine::Node;
    /// use serde_json::json;
    ///
    /// let node = Node::new("sum_doubled", &["doubled_numbers"], |inputs| {
    ///     let total: i64 = inputs.parse::<Vec<i64>>("doubled_numbers")?.iter().sum();
    ///     Ok(json!(total))
    /// });
    /// assert_eq!(node.dependencies(), ["doubled_numbers"]);
    /// ```
    pub fn new<F>(name: impl Into<String>, dependencies: &[&str], func: F) -> Self
    where
        F: Fn(&NodeInputs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            func: Arc::new(func),
            conditions: Vec::new(),
            doc: None,
        }
    }

    /// Only activate this node when the config value at `key` equals `value`.
    pub fn when(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn is_active(&self, config: &ValueMap) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| lookup(config, key) == Some(expected))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}

/// Values of a node's dependencies, handed to its function.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    values: BTreeMap<String, Value>,
}

impl NodeInputs {
    pub fn get(&self, name: &str) -> anyhow::Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("dependency '{name}' is not bound"))
    }

    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("dependency '{name}' is not a string"))
    }

    pub fn i64(&self, name: &str) -> anyhow::Result<i64> {
        self.get(name)?
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("dependency '{name}' is not an integer"))
    }

    pub fn f64(&self, name: &str) -> anyhow::Result<f64> {
        self.get(name)?
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("dependency '{name}' is not a number"))
    }

    pub fn bool(&self, name: &str) -> anyhow::Result<bool> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| anyhow::anyhow!("dependency '{name}' is not a boolean"))
    }

    pub fn array(&self, name: &str) -> anyhow::Result<&Vec<Value>> {
        self.get(name)?
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("dependency '{name}' is not a list"))
    }

    /// Deserialize a dependency into a typed value.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self.get(name)?.clone();
        serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("dependency '{name}' has an unexpected shape: {e}"))
    }
}

/// A named group of nodes, registered together.
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    nodes: Vec<Node>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// Collects nodes and configuration, then builds a [`Graph`].
///
/// The builder is reusable: the same builder may produce several graphs,
/// for example one per pipeline.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    config: ValueMap,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn with_module(self, module: &Module) -> Self {
        self.with_nodes(module.nodes().iter().cloned())
    }

    /// Add configuration; later keys replace earlier ones.
    pub fn with_config(mut self, config: ValueMap) -> Self {
        self.config.extend(config);
        self
    }

    /// Keep the active nodes and check that they form a DAG.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateNode`] when two active nodes share a name,
    /// [`EngineError::Cycle`] when dependencies loop.
    pub fn build(&self) -> EngineResult<Graph> {
        let mut nodes = BTreeMap::new();
        for node in self.nodes.iter().filter(|n| n.is_active(&self.config)) {
            if nodes.insert(node.name.clone(), node.clone()).is_some() {
                return Err(EngineError::DuplicateNode(node.name.clone()));
            }
        }

        let graph = Graph {
            nodes,
            config: self.config.clone(),
        };
        if let Some(path) = graph.find_cycle() {
            return Err(EngineError::Cycle { path });
        }
        tracing::debug!(nodes = graph.nodes.len(), "graph built");
        Ok(graph)
    }
}

/// An acyclic graph of active nodes with its baked configuration.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    config: ValueMap,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

enum Slot {
    Done(Value),
    /// Failed, either itself or because of the named node.
    Failed(String),
}

impl Graph {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut stack: Vec<&str> = Vec::new();
        for name in self.nodes.keys() {
            if let Some(path) = self.visit(name, &mut marks, &mut stack) {
                return Some(path);
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(name) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                path.push(name.to_string());
                return Some(path);
            }
            None => {}
        }
        let node = self.nodes.get(name)?;

        marks.insert(name, Mark::Visiting);
        stack.push(name);
        for dep in &node.dependencies {
            if let Some(path) = self.visit(dep, marks, stack) {
                return Some(path);
            }
        }
        stack.pop();
        marks.insert(name, Mark::Done);
        None
    }

    /// Nodes reachable from `final_vars` plus the leaves they need.
    ///
    /// Traversal stops at names in `overrides`: they are neither computed
    /// nor required.
    fn reachable(
        &self,
        final_vars: &[String],
        overrides: &ValueMap,
    ) -> EngineResult<(BTreeSet<String>, BTreeSet<String>)> {
        let mut nodes = BTreeSet::new();
        let mut leaves = BTreeSet::new();
        let mut pending: Vec<&str> = Vec::new();

        for var in final_vars {
            if !self.nodes.contains_key(var) && !overrides.contains_key(var) {
                return Err(EngineError::UnknownVariable(var.clone()));
            }
            pending.push(var);
        }

        while let Some(name) = pending.pop() {
            if overrides.contains_key(name) {
                continue;
            }
            match self.nodes.get(name) {
                Some(node) => {
                    if nodes.insert(name.to_string()) {
                        pending.extend(node.dependencies.iter().map(String::as_str));
                    }
                }
                None => {
                    leaves.insert(name.to_string());
                }
            }
        }
        Ok((nodes, leaves))
    }

    fn evaluate(
        &self,
        name: &str,
        bound: &Bindings<'_>,
        slots: &mut HashMap<String, Slot>,
        failures: &mut BTreeMap<String, EngineError>,
    ) {
        if slots.contains_key(name) {
            return;
        }
        if let Some(value) = bound.overrides.get(name) {
            tracing::trace!(node = %name, "using override");
            slots.insert(name.to_string(), Slot::Done(value.clone()));
            return;
        }
        let Some(node) = self.nodes.get(name) else {
            return;
        };

        let missing: Vec<String> = node
            .dependencies
            .iter()
            .filter(|dep| {
                !self.nodes.contains_key(*dep)
                    && !bound.inputs.contains_key(*dep)
                    && !bound.overrides.contains_key(*dep)
            })
            .cloned()
            .collect();
        if !missing.is_empty() {
            failures.insert(
                name.to_string(),
                EngineError::MissingInputs {
                    node: name.to_string(),
                    inputs: missing,
                },
            );
            slots.insert(name.to_string(), Slot::Failed(name.to_string()));
            return;
        }

        let mut values = BTreeMap::new();
        for dep in &node.dependencies {
            if self.nodes.contains_key(dep) || bound.overrides.contains_key(dep) {
                self.evaluate(dep, bound, slots, failures);
                match slots.get(dep) {
                    Some(Slot::Done(value)) => {
                        values.insert(dep.clone(), value.clone());
                    }
                    Some(Slot::Failed(origin)) => {
                        let origin = origin.clone();
                        slots.insert(name.to_string(), Slot::Failed(origin));
                        return;
                    }
                    None => {}
                }
            } else if let Some(value) = bound.inputs.get(dep) {
                values.insert(dep.clone(), value.clone());
            }
        }

        tracing::trace!(node = %name, "evaluating node");
        match (node.func)(&NodeInputs { values }) {
            Ok(value) => {
                slots.insert(name.to_string(), Slot::Done(value));
            }
            Err(source) => {
                tracing::debug!(node = %name, error = %source, "node failed");
                failures.insert(name.to_string(), EngineError::failed_node(name, source));
                slots.insert(name.to_string(), Slot::Failed(name.to_string()));
            }
        }
    }
}

/// Leaf inputs and node overrides for one execution.
struct Bindings<'a> {
    inputs: &'a ValueMap,
    overrides: &'a ValueMap,
}

impl Engine for Graph {
    fn config(&self) -> &ValueMap {
        &self.config
    }

    fn required_inputs(&self, final_vars: &[String], overrides: &ValueMap) -> EngineResult<BTreeSet<String>> {
        self.reachable(final_vars, overrides).map(|(_, leaves)| leaves)
    }

    fn execute(&self, final_vars: &[String], inputs: &ValueMap, overrides: &ValueMap) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        let mut slots = HashMap::new();
        let mut failures = BTreeMap::new();
        let bound = Bindings { inputs, overrides };
        let mut seen = HashSet::new();

        for var in final_vars {
            if !seen.insert(var.as_str()) {
                continue;
            }
            if !self.nodes.contains_key(var) && !overrides.contains_key(var) {
                report
                    .errors
                    .insert(var.clone(), EngineError::UnknownVariable(var.clone()));
                continue;
            }
            self.evaluate(var, &bound, &mut slots, &mut failures);
            match slots.get(var) {
                Some(Slot::Done(value)) => {
                    report.values.insert(var.clone(), value.clone());
                }
                Some(Slot::Failed(origin)) if origin == var => {
                    if let Some(error) = failures.remove(var) {
                        report.errors.insert(var.clone(), error);
                    }
                }
                Some(Slot::Failed(origin)) => {
                    report.errors.insert(
                        var.clone(),
                        EngineError::UpstreamFailed {
                            node: var.clone(),
                            upstream: origin.clone(),
                        },
                    );
                }
                None => {}
            }
        }
        report
    }

    fn visualize(&self, final_vars: &[String]) -> EngineResult<String> {
        let (nodes, leaves) = self.reachable(final_vars, &ValueMap::new())?;
        let mut dot = String::from("digraph execution {\n    rankdir=LR;\n");

        for leaf in &leaves {
            dot.push_str(&format!("    \"{leaf}\" [shape=ellipse, style=dashed];\n"));
        }
        for name in &nodes {
            if final_vars.contains(name) {
                dot.push_str(&format!("    \"{name}\" [shape=box, peripheries=2];\n"));
            } else {
                dot.push_str(&format!("    \"{name}\" [shape=box];\n"));
            }
        }
        for name in &nodes {
            if let Some(node) = self.nodes.get(name) {
                for dep in &node.dependencies {
                    dot.push_str(&format!("    \"{dep}\" -> \"{name}\";\n"));
                }
            }
        }
        dot.push_str("}\n");
        Ok(dot)
    }
}
