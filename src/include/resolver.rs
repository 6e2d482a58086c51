//! Include resolution
//!
//! The resolver walks an [`IncludeTree`] one level per relationship hop. At
//! each level, the references held by every visible entry are grouped into
//! batches per (field, target kind); each batch is loaded once and then used
//! as the input collection of the field's subtree.

use crate::config::ResolverConfig;
use crate::core::access::{AccessChecker, AccessResult};
use crate::core::error::{IncludeError, IncludeResult, LoaderError};
use crate::core::field::RelationshipItem;
use crate::core::loader::ResourceLoader;
use crate::core::resource::{AccessFailure, ResourceEntry, ResourceIdentity, ResourceObject};
use crate::include::{IncludeTree, IncludedSet};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How relationship targets are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Load targets through the [`ResourceLoader`]
    #[default]
    Standard,

    /// Prefer the in-memory targets attached to each reference
    ///
    /// Unsaved edits (including unsaved relationships) are rendered as they
    /// are. References without an attached object are read through the
    /// [`ResourceLoader`] in the same batch. Every resolved resource is
    /// marked uncacheable.
    Preview,
}

/// Per-call state threaded through the traversal
struct ResolveContext {
    mode: ResolutionMode,
    cancel: CancellationToken,
}

/// References of one field pointing at one target kind
struct Batch {
    kind: String,
    references: Vec<RelationshipItem>,
}

/// Work for one field of one tree level
struct FieldPlan<'a> {
    field: &'a str,
    children: &'a IncludeTree,
    failures: Vec<ResourceEntry>,
    batches: Vec<Batch>,
}

/// Resolves include parameters against collections of resources
pub struct IncludeResolver {
    loader: Arc<dyn ResourceLoader>,
    access: Arc<dyn AccessChecker>,
    config: ResolverConfig,
}

impl IncludeResolver {
    pub fn new(loader: Arc<dyn ResourceLoader>, access: Arc<dyn AccessChecker>) -> Self {
        Self {
            loader,
            access,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn access_checker(&self) -> &Arc<dyn AccessChecker> {
        &self.access
    }

    /// Resolve a raw include parameter against `roots`
    ///
    /// Roots are expected to be access-checked already.
    pub async fn resolve(
        &self,
        roots: &[ResourceEntry],
        include_parameter: &str,
        mode: ResolutionMode,
    ) -> IncludeResult<IncludedSet> {
        self.resolve_with_cancel(roots, include_parameter, mode, CancellationToken::new())
            .await
    }

    /// Like [`resolve`](Self::resolve), aborting with `Cancelled` once `cancel` fires
    pub async fn resolve_with_cancel(
        &self,
        roots: &[ResourceEntry],
        include_parameter: &str,
        mode: ResolutionMode,
        cancel: CancellationToken,
    ) -> IncludeResult<IncludedSet> {
        let tree = IncludeTree::parse(include_parameter)?;
        self.resolve_tree(&tree, roots, mode, cancel).await
    }

    /// Resolve an already parsed tree
    ///
    /// Partial results are discarded on failure or cancellation.
    pub async fn resolve_tree(
        &self,
        tree: &IncludeTree,
        roots: &[ResourceEntry],
        mode: ResolutionMode,
        cancel: CancellationToken,
    ) -> IncludeResult<IncludedSet> {
        if tree.is_empty() || roots.is_empty() {
            return Ok(IncludedSet::new());
        }

        let ctx = ResolveContext { mode, cancel };
        tracing::debug!(
            paths = ?tree.paths(),
            roots = roots.len(),
            mode = ?mode,
            "resolving includes"
        );

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => Err(IncludeError::Cancelled),
            result = self.resolve_level(tree, roots, &ctx) => result,
        }
    }

    /// Resolve every field of one tree level against `entries`
    fn resolve_level<'a>(
        &'a self,
        tree: &'a IncludeTree,
        entries: &'a [ResourceEntry],
        ctx: &'a ResolveContext,
    ) -> BoxFuture<'a, IncludeResult<IncludedSet>> {
        async move {
            let mut layout = Vec::with_capacity(tree.len());
            let mut jobs = Vec::new();
            for (field, children) in tree.iter() {
                let plan = self.plan_field(field, children, entries);
                layout.push((plan.failures, plan.batches.len()));
                for batch in plan.batches {
                    jobs.push(self.resolve_batch(plan.field, plan.children, batch, ctx));
                }
            }

            // Batches run concurrently but are merged in tree order
            let results: Vec<IncludedSet> = stream::iter(jobs)
                .buffered(self.config.max_concurrent_batches.max(1))
                .try_collect()
                .await?;

            let mut results = results.into_iter();
            let mut included = IncludedSet::new();
            for (failures, batch_count) in layout {
                included.extend(failures);
                for batch in results.by_ref().take(batch_count) {
                    included.merge(batch);
                }
            }
            Ok(included)
        }
        .boxed()
    }

    /// Collect the references of `field` held by `entries`, grouped by target kind
    fn plan_field<'a>(
        &self,
        field: &'a str,
        children: &'a IncludeTree,
        entries: &[ResourceEntry],
    ) -> FieldPlan<'a> {
        let mut failures = Vec::new();
        let mut batches: IndexMap<String, Vec<RelationshipItem>> = IndexMap::new();

        for entry in entries {
            let resource = match entry {
                ResourceEntry::Denied(_) => continue,
                ResourceEntry::LabelOnly(resource) => {
                    failures.push(ResourceEntry::Denied(AccessFailure::label_only(
                        resource, field,
                    )));
                    continue;
                }
                ResourceEntry::Resource(resource) => resource,
            };

            // Collections mix variants: a missing field is not an error
            let Some(references) = resource.relationship(field) else {
                continue;
            };

            if let AccessResult::Denied { reason } = self.access.check_field(resource, field) {
                tracing::debug!(
                    resource = %resource.identity(),
                    field = %field,
                    reason = %reason,
                    "relationship access denied"
                );
                failures.push(ResourceEntry::Denied(AccessFailure::relationship_denied(
                    resource, field, reason,
                )));
                continue;
            }

            for item in references {
                batches
                    .entry(item.target.kind.clone())
                    .or_default()
                    .push(item.clone());
            }
        }

        FieldPlan {
            field,
            children,
            failures,
            batches: batches
                .into_iter()
                .map(|(kind, references)| Batch { kind, references })
                .collect(),
        }
    }

    /// Load one batch and resolve the field's subtree against it
    fn resolve_batch<'a>(
        &'a self,
        field: &'a str,
        children: &'a IncludeTree,
        batch: Batch,
        ctx: &'a ResolveContext,
    ) -> BoxFuture<'a, IncludeResult<IncludedSet>> {
        async move {
            tracing::debug!(
                field = %field,
                kind = %batch.kind,
                references = batch.references.len(),
                "resolving relationship batch"
            );

            let entries: Vec<ResourceEntry> = self
                .load_batch(batch, ctx)
                .await?
                .into_iter()
                .filter(|entry| !entry.is_internal())
                .map(|entry| entry.with_relationship_field(field))
                .collect();

            let mut included: IncludedSet = entries.iter().cloned().collect();
            if !children.is_empty() && !entries.is_empty() {
                let nested = self.resolve_level(children, &entries, ctx).await?;
                included.merge(nested);
            }
            Ok(included)
        }
        .boxed()
    }

    async fn load_batch(
        &self,
        batch: Batch,
        ctx: &ResolveContext,
    ) -> IncludeResult<Vec<ResourceEntry>> {
        match ctx.mode {
            ResolutionMode::Preview => self.load_preview_batch(batch, ctx).await,
            ResolutionMode::Standard => {
                let mut ids: Vec<Uuid> = batch.references.iter().map(|item| item.target.id).collect();
                if self.config.dedupe_references {
                    let mut seen = HashSet::new();
                    ids.retain(|id| seen.insert(*id));
                }
                self.load_stored(&batch.kind, &ids, ctx).await
            }
        }
    }

    /// Attached in-memory targets win; the remaining references are loaded
    ///
    /// Entries keep reference order and are all marked uncacheable.
    async fn load_preview_batch(
        &self,
        batch: Batch,
        ctx: &ResolveContext,
    ) -> IncludeResult<Vec<ResourceEntry>> {
        let mut in_memory: HashMap<ResourceIdentity, Arc<ResourceObject>> = HashMap::new();
        let mut targets: IndexSet<ResourceIdentity> = IndexSet::new();
        for item in batch.references {
            if let Some(entity) = item.entity {
                in_memory.entry(item.target.clone()).or_insert(entity);
            }
            targets.insert(item.target);
        }

        let stored_ids: Vec<Uuid> = targets
            .iter()
            .filter(|target| !in_memory.contains_key(*target))
            .map(|target| target.id)
            .collect();
        let mut stored: HashMap<ResourceIdentity, ResourceEntry> = if stored_ids.is_empty() {
            HashMap::new()
        } else {
            self.load_stored(&batch.kind, &stored_ids, ctx)
                .await?
                .into_iter()
                .map(|entry| (entry.identity().clone(), entry))
                .collect()
        };

        Ok(targets
            .into_iter()
            .filter_map(|target| match in_memory.remove(&target) {
                Some(entity) => Some(
                    self.access
                        .check_resource(Arc::new(Arc::unwrap_or_clone(entity).uncacheable())),
                ),
                // dangling stored references are omitted
                None => stored.remove(&target).map(ResourceEntry::uncacheable),
            })
            .collect())
    }

    /// Read access-checked entries for `ids` through the loader
    async fn load_stored(
        &self,
        kind: &str,
        ids: &[Uuid],
        ctx: &ResolveContext,
    ) -> IncludeResult<Vec<ResourceEntry>> {
        if ctx.cancel.is_cancelled() {
            return Err(IncludeError::Cancelled);
        }

        self.loader
            .load_access_checked(kind, ids, &ctx.cancel)
            .await
            .map_err(|err| {
                if ctx.cancel.is_cancelled() {
                    return IncludeError::Cancelled;
                }
                tracing::warn!(
                    kind = %kind,
                    count = ids.len(),
                    error = %err,
                    "failed to load relationship batch"
                );
                LoaderError::BatchFailed {
                    kind: kind.to_string(),
                    count: ids.len(),
                    message: format!("{:#}", err),
                }
                .into()
            })
    }
}
