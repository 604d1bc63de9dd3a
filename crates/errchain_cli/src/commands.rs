//! Command handlers.

use crate::cli::RenderArgs;
use errchain::{ErrchainConfig, ErrorValue, Factory};
use std::io::{self, Write};
use tracing::{debug, info, instrument};

/// Build a chain from `messages`, innermost first.
///
/// The first message is constructed, every later one wraps the chain so far.
pub fn build_chain<'m>(factory: Factory<'m>, messages: &'m [String], borrowed: bool) -> ErrorValue<'m> {
    let mut messages = messages.iter().map(String::as_str);
    let first = messages.next();

    let mut chain = if borrowed {
        factory.borrowed(first)
    } else {
        factory.copied(first)
    };
    for message in messages {
        chain = if borrowed {
            factory.wrap_borrowed(Some(chain), message)
        } else {
            factory.wrap(Some(chain), message)
        };
    }
    chain
}

/// Handle `errchain render`.
#[instrument(skip_all, fields(messages = args.messages.len(), borrowed = args.borrowed))]
pub fn run_render(config: &ErrchainConfig, args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut allocator_config = config.allocator().clone();
    if let Some(limit) = args.limit_bytes {
        allocator_config = allocator_config.with_limit_bytes(Some(limit));
    }
    if args.stats {
        allocator_config = allocator_config.with_tracking(true);
    }

    let mut render_config = config.render().clone();
    if let Some(header) = args.header {
        render_config = render_config.with_header(Some(header));
    }
    if let Some(trailer) = args.trailer {
        render_config = render_config.with_trailer(Some(trailer));
    }

    let allocator = allocator_config.build();
    let chain = build_chain(Factory::new(&allocator), &args.messages, args.borrowed);
    debug!(
        depth = chain.depth(),
        out_of_memory = chain.is_out_of_memory(),
        "Built error chain"
    );

    let mut stdout = io::stdout().lock();
    let rendered = render_config.render_to_writer(Some(chain.node()), &mut stdout);
    stdout.flush()?;
    chain.destroy();

    if let Some(stats) = allocator.stats() {
        info!(
            live = stats.live(),
            allocated = stats.allocated(),
            released = stats.released(),
            refused = stats.refused(),
            "Allocation counters after destroy"
        );
        if args.stats {
            eprintln!(
                "allocated={} released={} refused={} live={}",
                stats.allocated(),
                stats.released(),
                stats.refused(),
                stats.live()
            );
        }
    }

    rendered?;
    Ok(())
}

/// Handle `errchain config`.
pub fn print_config(config: &ErrchainConfig) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
