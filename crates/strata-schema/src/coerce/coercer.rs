//! Primitive coercion over a reshaped tree.
//!
//! Runs after the reshaper. Converts primitive values towards their declared
//! shapes, wraps scalars given for arrays, settles unions and records where
//! decodable content was found.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use strata_node::{Node, NodePath, Record};
use tracing::debug;

use crate::registry::{CompiledType, SchemaSet};
use crate::shape::Shape;
use crate::validate::is_valid;

use super::primitive::{coerce_enum, coerce_scalar, unwrap_singleton};
use super::record_target;
use super::reshape::Reshaper;
use super::warning::CoerceWarning;

/// A string found where a decode directive applies.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeSite {
    pub path: NodePath,
    pub format: String,
    /// Shape the decoded content must have.
    pub shape: Shape,
}

/// Union outcomes already computed, by value path, union and hops taken.
///
/// Sibling trials of an enclosing union hand the same nested value to the
/// same nested union; without the cache every level of nesting would
/// multiply the work by the number of alternatives.
type UnionKey = (NodePath, *const Shape, usize);
type UnionCache = Rc<RefCell<AHashMap<UnionKey, Vec<(Node, Settled)>>>>;

#[derive(Debug, Clone)]
struct Settled {
    node: Node,
    warnings: Vec<CoerceWarning>,
    sites: Vec<DecodeSite>,
}

impl Settled {
    /// Properties the reshaper had to drop to fit the value to the variant.
    fn dropped(&self) -> usize {
        self.warnings
            .iter()
            .filter(|warning| {
                matches!(
                    warning,
                    CoerceWarning::UnknownProperty { .. } | CoerceWarning::DuplicateProperty { .. }
                )
            })
            .count()
    }
}

/// Coerces one tree. Union outcomes are cached for the lifetime of the
/// coercer, so use a fresh one per tree.
pub struct Coercer<'s> {
    schemas: &'s SchemaSet,
    warnings: Vec<CoerceWarning>,
    sites: Vec<DecodeSite>,
    /// Union types entered without descending into a child value.
    hops: usize,
    unions: UnionCache,
}

impl<'s> Coercer<'s> {
    pub fn new(schemas: &'s SchemaSet) -> Self {
        Self {
            schemas,
            warnings: Vec::new(),
            sites: Vec::new(),
            hops: 0,
            unions: UnionCache::default(),
        }
    }

    /// A coercer for a trial, sharing this one's cache.
    fn fork(&self) -> Self {
        Self {
            schemas: self.schemas,
            warnings: Vec::new(),
            sites: Vec::new(),
            hops: self.hops,
            unions: self.unions.clone(),
        }
    }

    pub fn finish(self) -> (Vec<CoerceWarning>, Vec<DecodeSite>) {
        (self.warnings, self.sites)
    }

    pub fn coerce(&mut self, node: Node, shape: &Shape, path: &mut NodePath) -> Node {
        match shape {
            Shape::Any => node,
            Shape::Null | Shape::Boolean | Shape::Integer | Shape::Number | Shape::String => {
                coerce_scalar(node, shape)
            }
            Shape::Object => unwrap_singleton(node),
            Shape::Enum(values) => coerce_enum(node, values),
            Shape::Array(items) => {
                let values = match node {
                    Node::Array(values) => values,
                    other => vec![other],
                };
                let hops = core::mem::take(&mut self.hops);
                let mut coerced = Vec::with_capacity(values.len());
                for (index, value) in values.into_iter().enumerate() {
                    path.push_index(index);
                    coerced.push(self.coerce(value, items, path));
                    path.pop();
                }
                self.hops = hops;
                Node::Array(coerced)
            }
            Shape::Ref(name) => self.coerce_reference(node, name, path),
            Shape::OneOf(alternatives) => self.coerce_union(node, alternatives, path),
            Shape::Decode { format, inner } => match node {
                Node::String(content) => {
                    self.sites.push(DecodeSite {
                        path: path.clone(),
                        format: format.clone(),
                        shape: (**inner).clone(),
                    });
                    Node::String(content)
                }
                other => self.coerce(other, inner, path),
            },
        }
    }

    fn coerce_reference(&mut self, node: Node, name: &str, path: &mut NodePath) -> Node {
        let schemas = self.schemas;
        let Some(compiled) = schemas.get(name) else {
            return node;
        };
        if let Some(alternatives) = &compiled.schema.alternatives {
            if self.hops >= schemas.reference_limit() {
                return node;
            }
            self.hops += 1;
            let node = self.coerce_union(node, alternatives, path);
            self.hops -= 1;
            return node;
        }
        match unwrap_singleton(node) {
            Node::Record(record) => match record_target(schemas, &record, name) {
                Some(target) => Node::Record(self.coerce_record(record, target, path)),
                None => Node::Record(record),
            },
            other => other,
        }
    }

    fn coerce_record(
        &mut self,
        record: Record,
        compiled: &'s CompiledType,
        path: &mut NodePath,
    ) -> Record {
        let hops = core::mem::take(&mut self.hops);
        let mut coerced = Record::new();
        for (key, value) in record {
            let Some(property) = compiled.schema.property(&key) else {
                self.warnings.push(CoerceWarning::UnknownProperty {
                    property: key,
                    path: path.clone(),
                });
                continue;
            };
            path.push_property(key.clone());
            let value = self.coerce(value, &property.shape, path);
            path.pop();
            coerced.insert(key, value);
        }
        self.hops = hops;
        coerced
    }

    fn coerce_union(&mut self, node: Node, alternatives: &[Shape], path: &mut NodePath) -> Node {
        let key = (path.clone(), alternatives.as_ptr(), self.hops);
        let cached = self.unions.borrow().get(&key).and_then(|outcomes| {
            outcomes
                .iter()
                .find(|(input, _)| *input == node)
                .map(|(_, settled)| settled.clone())
        });
        let settled = match cached {
            Some(settled) => settled,
            None => {
                let input = node.clone();
                let settled = self.settle_union(node, alternatives, path);
                self.unions
                    .borrow_mut()
                    .entry(key)
                    .or_default()
                    .push((input, settled.clone()));
                settled
            }
        };
        self.warnings.extend(settled.warnings);
        self.sites.extend(settled.sites);
        settled.node
    }

    /// Settle a value against a union.
    ///
    /// A value already matching exactly one alternative is coerced within it,
    /// as is a record whose discriminator names an alternative. Otherwise
    /// every alternative is tried on a copy, and a copy that ends up matching
    /// its alternative and no other is a candidate. The candidate that
    /// dropped the fewest properties wins, the earliest declared on a tie.
    /// If there is none, the value is returned as is for the validator to
    /// report.
    fn settle_union(&self, node: Node, alternatives: &[Shape], path: &NodePath) -> Settled {
        let schemas = self.schemas;
        let matching: Vec<&Shape> = alternatives
            .iter()
            .filter(|alternative| is_valid(schemas, &node, alternative))
            .collect();
        let selected = match matching.as_slice() {
            [alternative] => Some(*alternative),
            [] => node.type_name().and_then(|type_name| {
                alternatives
                    .iter()
                    .find(|alternative| alternative.names_type(type_name))
            }),
            _ => {
                return Settled {
                    node,
                    warnings: Vec::new(),
                    sites: Vec::new(),
                };
            }
        };
        if let Some(alternative) = selected {
            let mut within = self.fork();
            let node = within.coerce(node, alternative, &mut path.clone());
            return Settled {
                node,
                warnings: within.warnings,
                sites: within.sites,
            };
        }

        let mut best: Option<(&Shape, Settled)> = None;
        for alternative in alternatives {
            let trial = self.trial(node.clone(), alternative, path);
            let unique = is_valid(schemas, &trial.node, alternative)
                && alternatives
                    .iter()
                    .filter(|other| is_valid(schemas, &trial.node, other))
                    .count()
                    == 1;
            if !unique {
                continue;
            }
            let lossless = trial.dropped() == 0;
            if best
                .as_ref()
                .is_none_or(|(_, current)| trial.dropped() < current.dropped())
            {
                best = Some((alternative, trial));
            }
            if lossless {
                break;
            }
        }
        match best {
            Some((alternative, settled)) => {
                debug!(%path, variant = %alternative, "coerced value into union variant");
                settled
            }
            None => Settled {
                node,
                warnings: Vec::new(),
                sites: Vec::new(),
            },
        }
    }

    /// Reshape and coerce a copy of `node` as `alternative`.
    fn trial(&self, node: Node, alternative: &Shape, path: &NodePath) -> Settled {
        let mut trial_path = path.clone();
        let mut reshaper = Reshaper::new(self.schemas);
        let candidate = reshaper.reshape(node, alternative, &mut trial_path);
        let mut warnings = reshaper.into_warnings();
        let mut coercer = self.fork();
        let node = coercer.coerce(candidate, alternative, &mut trial_path);
        warnings.extend(coercer.warnings);
        Settled {
            node,
            warnings,
            sites: coercer.sites,
        }
    }
}
