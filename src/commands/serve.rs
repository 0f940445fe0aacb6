use crate::cli::ServeArgs;
use crate::layout::LayoutEngine;
use crate::runtime::Voyager;
use crate::server::{PageOptions, serve};
use crate::style;
use std::sync::Arc;

use super::{CommandContext, runtime};

pub fn cmd_serve(args: ServeArgs) -> i32 {
    let ctx = match CommandContext::new(&args.source, &args.display) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    style::status(&format!("Loading schema from {}", ctx.source));

    let result = rt.block_on(async {
        let engine = LayoutEngine::spawn(
            Arc::new(ctx.config.layout.backend()),
            ctx.config.layout.settings(),
        );
        let handle = Voyager::spawn(Arc::clone(&ctx.provider), engine, ctx.options.clone());
        let page = PageOptions {
            endpoint_url: ctx.endpoint_url.clone(),
            display_options: ctx.options.clone(),
            headers: ctx.headers.clone(),
        };
        serve(handle, page, args.port, args.open).await
    });

    if let Err(e) = result {
        style::error(&format!("Server failed: {}", e));
        return 1;
    }

    0
}
