//! Include resolution and preview demo
//!
//! This example demonstrates:
//! - Loading a schema with access policies from YAML
//! - Validating the configured preview includes
//! - Resolving includes against stored resources
//! - Previewing an unsaved edit, including an unsaved relationship
//!
//! Run with `RUST_LOG=includes=debug` to follow the traversal.

use includes::prelude::*;
use tracing_subscriber::EnvFilter;

const SCHEMA: &str = include_str!("includes.yaml");

fn describe(set: &IncludedSet) {
    for entry in set.iter() {
        match entry {
            ResourceEntry::Resource(resource) => println!(
                "   - {} {} ({:?})",
                resource.type_name(),
                resource.label().unwrap_or("-"),
                resource.cache_max_age()
            ),
            ResourceEntry::LabelOnly(resource) => println!(
                "   - {} {} (label only)",
                resource.type_name(),
                resource.label().unwrap_or("-")
            ),
            ResourceEntry::Denied(failure) => println!("   - denied: {}", failure),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("📚 Include resolution demo");
    println!("==========================\n");

    let config = IncludesConfig::from_yaml_str(SCHEMA)?;
    let registry = ResourceTypeRegistry::from_config(&config)?;
    let settings = config.preview.clone().unwrap_or_default();
    settings.validate(&registry)?;
    println!("✅ Loaded {} resource types", registry.len());
    println!("✅ Preview includes are valid\n");

    let editor = AuthContext::User {
        user_id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        roles: vec!["editor".to_string()],
    };
    let access: Arc<dyn AccessChecker> =
        Arc::new(PolicyAccessChecker::from_config(&config, editor)?);
    let loader = InMemoryResourceLoader::with_access_checker(access.clone());
    let resolver = Arc::new(
        IncludeResolver::new(Arc::new(loader.clone()), access.clone())
            .with_config(config.resolver.clone()),
    );

    let type_of = |name: &str| {
        registry
            .get_by_type_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown type {}", name))
    };

    // Stored data
    let grace = loader.insert(
        ResourceObject::new(type_of("user--user")?, Uuid::new_v4())
            .with_label("Grace")
            .with_field("name", "Grace"),
    )?;
    let ada = loader.insert(
        ResourceObject::new(type_of("user--user")?, Uuid::new_v4())
            .with_label("Ada")
            .with_field("name", "Ada")
            .with_relationship(
                "manager",
                [RelationshipItem::reference(grace.identity().clone())],
            ),
    )?;
    let rust = loader.insert(
        ResourceObject::new(type_of("taxonomy_term--tags")?, Uuid::new_v4())
            .with_label("rust")
            .with_field("name", "rust"),
    )?;
    let article = ResourceObject::new(type_of("node--article")?, Uuid::new_v4())
        .with_label("Hello")
        .with_field("title", "Hello")
        .with_relationship("author", [RelationshipItem::reference(ada.identity().clone())])
        .with_relationship("tags", [RelationshipItem::reference(rust.identity().clone())]);

    println!("🔗 include=author.manager,tags");
    let roots = vec![access.check_resource(Arc::new(article.clone()))];
    let included = resolver
        .resolve(&roots, "author.manager,tags", ResolutionMode::Standard)
        .await?;
    describe(&included);

    // Unsaved edit: a new tag that only exists in memory. The author is
    // untouched and still comes from storage.
    println!("\n👀 Preview with an unsaved tag");
    let draft_tag = Arc::new(
        ResourceObject::new(type_of("taxonomy_term--tags")?, Uuid::new_v4())
            .with_label("preview")
            .with_field("name", "preview"),
    );
    let draft = article.with_relationship(
        "tags",
        [
            RelationshipItem::loaded(rust.clone()),
            RelationshipItem::loaded(draft_tag),
        ],
    );

    let service = PreviewService::new(settings, resolver);
    let document = service.render(draft, &[]).await?;
    describe(&document.included);
    println!("   cache: {:?}", document.cache_max_age);

    Ok(())
}
