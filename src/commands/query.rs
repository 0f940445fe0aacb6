use crate::cli::QueryArgs;
use crate::introspection::INTROSPECTION_QUERY;
use crate::style;

pub fn cmd_query(args: QueryArgs) -> i32 {
    if !args.json {
        println!("{}", INTROSPECTION_QUERY);
        return 0;
    }

    let body = serde_json::json!({ "query": INTROSPECTION_QUERY });
    match serde_json::to_string_pretty(&body) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            style::error(&format!("Failed to encode query: {}", e));
            1
        }
    }
}
