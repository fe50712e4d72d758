use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::constants::trace::{
    BASE_HOUR, CHAIN_LEN, HOUR_JITTER, MINUTE_JITTER, TIMESTAMP_FORMAT, UNKNOWN,
};
use crate::details::DetailField;
use crate::random::RandomSource;
use crate::templates::{NodeCategory, StatusKind, TemplatePool};
use crate::types::{DetailValue, FieldLabel, ProductId, TimestampText};

/// Clock used to anchor timestamps and time-derived detail values.
///
/// Node timestamps use the instant's local wall time; certificate digits and
/// shelf dates use its UTC view.
pub type Clock = fn() -> DateTime<FixedOffset>;

fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// One generated stage of a trace chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceNode {
    /// Position in generation order (farming = 1, retail = 5).
    pub id: u32,
    /// Stage of the node.
    pub category: NodeCategory,
    /// Site name from the template.
    pub name: String,
    /// Site address from the template.
    pub address: String,
    /// Icon token from the template.
    pub icon: String,
    /// Color token from the template.
    pub color: String,
    /// Status text of the stage.
    pub status: String,
    /// Classification of `status`.
    pub status_kind: StatusKind,
    /// Local wall-clock time of the stage event.
    pub timestamp: NaiveDateTime,
    /// Label -> generated value, in the template's field order.
    pub details: IndexMap<FieldLabel, DetailValue>,
}

impl TraceNode {
    /// Timestamp as `YYYY/MM/DD HH:MM`.
    pub fn time_display(&self) -> TimestampText {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Generated value for `field`, if the template declared it.
    pub fn detail(&self, field: DetailField) -> Option<&str> {
        self.details.get(field.label()).map(String::as_str)
    }
}

/// Five-node supply chain for one product, newest node first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceChain {
    /// Product the chain was generated for.
    pub product_id: ProductId,
    nodes: Vec<TraceNode>,
}

impl TraceChain {
    /// Nodes, newest first.
    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for a chain without nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Most recent node (retail for generated chains).
    pub fn latest(&self) -> Option<&TraceNode> {
        self.nodes.first()
    }

    /// First node of `category`.
    pub fn node(&self, category: NodeCategory) -> Option<&TraceNode> {
        self.nodes.iter().find(|node| node.category == category)
    }

    /// True when every node is classified `Success`.
    pub fn all_passed(&self) -> bool {
        self.nodes.iter().all(|node| node.status_kind.is_success())
    }
}

/// Summary figures derived from a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStats {
    /// Number of nodes.
    pub total_nodes: usize,
    /// Every node classified `Success`.
    pub all_passed: bool,
    /// Display timestamp of the newest node.
    pub last_update: TimestampText,
    /// Transport node's duration detail, or `unknown`.
    pub transport_duration: DetailValue,
}

impl TraceStats {
    /// Derive stats from `chain`.
    pub fn from_chain(chain: &TraceChain) -> Self {
        Self {
            total_nodes: chain.len(),
            all_passed: chain.all_passed(),
            last_update: chain
                .latest()
                .map(TraceNode::time_display)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            transport_duration: chain
                .node(NodeCategory::Transport)
                .and_then(|node| node.detail(DetailField::Duration))
                .unwrap_or(UNKNOWN)
                .to_string(),
        }
    }
}

struct GeneratorState {
    rng: Box<dyn RandomSource>,
    chains: HashMap<ProductId, Arc<TraceChain>>,
}

/// Synthesizes trace chains and memoizes them per product id.
///
/// Chains are never regenerated: every request for a product id after the
/// first returns the same shared `Arc`.
pub struct TraceGenerator {
    pool: TemplatePool,
    clock: Clock,
    state: Mutex<GeneratorState>,
}

impl TraceGenerator {
    /// Generator over the built-in template pool using the local clock.
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self::with_pool(TemplatePool::builtin(), rng)
    }

    /// Generator over a custom template pool using the local clock.
    pub fn with_pool(pool: TemplatePool, rng: Box<dyn RandomSource>) -> Self {
        Self {
            pool,
            clock: local_now,
            state: Mutex::new(GeneratorState {
                rng,
                chains: HashMap::new(),
            }),
        }
    }

    /// Override the clock (useful for reproducible timestamps).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Template pool nodes are drawn from.
    pub fn pool(&self) -> &TemplatePool {
        &self.pool
    }

    /// Return the chain for `product_id`, generating it on first request.
    pub fn get_chain(&self, product_id: &str) -> Arc<TraceChain> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(chain) = state.chains.get(product_id) {
            return Arc::clone(chain);
        }
        debug!(product_id, "generating trace chain");
        let now = (self.clock)();
        let chain = Arc::new(self.build_chain(product_id, state.rng.as_mut(), now));
        state
            .chains
            .insert(product_id.to_string(), Arc::clone(&chain));
        chain
    }

    /// Stats derived from the (possibly freshly generated) chain.
    pub fn get_stats(&self, product_id: &str) -> TraceStats {
        TraceStats::from_chain(&self.get_chain(product_id))
    }

    /// True once a chain for `product_id` exists.
    pub fn is_cached(&self, product_id: &str) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .chains
            .contains_key(product_id)
    }

    /// Number of memoized chains.
    pub fn cached_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .chains
            .len()
    }

    fn build_chain(
        &self,
        product_id: &str,
        rng: &mut dyn RandomSource,
        now: DateTime<FixedOffset>,
    ) -> TraceChain {
        let mut nodes = Vec::with_capacity(CHAIN_LEN);
        for (idx, category) in NodeCategory::ALL.into_iter().enumerate() {
            let stage = self.pool.stage(category);
            let templates = stage.templates();
            let template = &templates[rng.index(templates.len())];
            let timestamp = stage_timestamp(category, rng, now.naive_local());
            let details = template
                .fields
                .iter()
                .map(|field| (field.label().to_string(), field.generate(rng, now)))
                .collect();
            nodes.push(TraceNode {
                id: idx as u32 + 1,
                category,
                name: template.name.to_string(),
                address: template.address.to_string(),
                icon: template.icon.to_string(),
                color: template.color.to_string(),
                status: stage.status_label().to_string(),
                status_kind: stage.status_kind(),
                timestamp,
                details,
            });
        }
        nodes.reverse();
        TraceChain {
            product_id: product_id.to_string(),
            nodes,
        }
    }
}

/// Timestamp `days_ago` days before `now`, at the stage's hour plus jitter.
fn stage_timestamp(
    category: NodeCategory,
    rng: &mut dyn RandomSource,
    now: NaiveDateTime,
) -> NaiveDateTime {
    let day = (now - Duration::days(category.days_ago())).date();
    let hour = BASE_HOUR + category.hour_offset() + rng.index(HOUR_JITTER) as i64;
    let minute = rng.index(MINUTE_JITTER) as i64;
    day.and_time(NaiveTime::MIN) + Duration::hours(hour) + Duration::minutes(minute)
}
