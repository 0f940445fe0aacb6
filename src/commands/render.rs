use crate::api::{build_graph, load_schema, render_graph};
use crate::cli::{RenderArgs, RenderFormat};
use crate::error::SchemamapError;
use crate::fs::{FileSystem, RealFs};
use crate::graph::GraphData;
use crate::introspection::INTROSPECTION_QUERY;
use crate::layout::to_dot;
use crate::model::Selection;
use crate::server::render_static_page;
use crate::style;
use std::sync::Arc;
use tracing::debug;

use super::{CommandContext, runtime};

pub fn cmd_render(args: RenderArgs) -> i32 {
    let ctx = match CommandContext::new(&args.source, &args.display) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    let (output, summary) = match rt.block_on(render_output(&ctx, args.format)) {
        Ok(rendered) => rendered,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    match args.output {
        Some(path) => {
            if let Err(e) = RealFs.write(&path, &output) {
                style::error(&format!("Failed to write output file: {}", e));
                return 1;
            }
            style::success(&format!("{} written to {}", summary, style::path(&path)));
        }
        None => print!("{}", output),
    }

    0
}

/// The rendered document plus a one-line description of what it shows.
async fn render_output(
    ctx: &CommandContext,
    format: RenderFormat,
) -> Result<(String, String), SchemamapError> {
    let payload = ctx.provider.fetch(INTROSPECTION_QUERY).await?;
    let schema = load_schema(&payload, &ctx.options)?;
    let graph = build_graph(&schema, &ctx.options)?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "type graph built"
    );
    let summary = format!(
        "{} types reachable from {}",
        graph.node_count(),
        style::type_name(graph.root_id())
    );

    let output = match format {
        RenderFormat::Dot => to_dot(&graph),
        RenderFormat::Json => {
            let data = GraphData::from_type_graph(&graph, &Selection::default());
            serde_json::to_string_pretty(&data)
                .map_err(|e| SchemamapError::Io(std::io::Error::other(e)))?
        }
        RenderFormat::Svg | RenderFormat::Html => {
            let backend = Arc::new(ctx.config.layout.backend());
            let settings = ctx.config.layout.settings();
            let render = render_graph(Arc::new(graph), backend, settings).await?;
            if format == RenderFormat::Html {
                render_static_page(&ctx.source, &render.markup)
            } else {
                render.markup
            }
        }
    };
    Ok((output, summary))
}
