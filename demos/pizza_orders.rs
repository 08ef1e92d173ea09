//! Pizza orders sharing size tiers through a context factory.
//!
//! Run with: `cargo run --example pizza_orders`
//! Set `RUST_LOG=internkit=trace` to watch interning decisions.

use internkit::builder::FactoryBuilder;
use internkit::error::InvalidArgument;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SizeTier {
    diameter_cm: u32,
    label: &'static str,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut factory = FactoryBuilder::new()
        .table_capacity(3)
        .registry_capacity(9)
        .validate_unique(|name: &String| {
            if name.trim().is_empty() {
                Err(InvalidArgument::new("pizza name must not be blank"))
            } else {
                Ok(())
            }
        })
        .build::<SizeTier>();

    let tiers = [
        SizeTier {
            diameter_cm: 30,
            label: "large",
        },
        SizeTier {
            diameter_cm: 25,
            label: "medium",
        },
        SizeTier {
            diameter_cm: 10,
            label: "small",
        },
    ];
    let pizzas = ["Margherita", "Salami", "Four cheese"];

    for pizza in pizzas {
        for tier in &tiers {
            factory.make_context(pizza.to_string(), tier.clone());
        }
    }

    if let Err(err) = factory.try_make_context("   ".to_string(), tiers[0].clone()) {
        println!("Rejected order: {}", err);
    }

    println!("Orders created: {}", factory.created_count());
    println!("Shared size objects: {}", factory.table().size());
    for (id, order) in factory.contexts() {
        println!("{}", "-".repeat(20));
        println!("Order #{}", id.index());
        println!("  unique state: {}", order.unique());
        println!(
            "  shared state: {} ({} cm) [handle {}]",
            order.shared_state().label,
            order.shared_state().diameter_cm,
            order.shared().id()
        );
    }
}
