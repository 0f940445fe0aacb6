//! Static host document for the diagram.

use crate::model::DisplayOptions;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    /// Shown in the header; the server does the fetching.
    pub endpoint_url: Option<String>,
    pub display_options: DisplayOptions,
    pub headers: BTreeMap<String, String>,
}

/// Render the page with `options` embedded as its initial configuration.
pub fn render_page(options: &PageOptions) -> String {
    let config = serde_json::to_string(options).unwrap_or_else(|_| "{}".to_string());
    let title = options
        .endpoint_url
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "schemamap".to_string());

    PAGE_TEMPLATE
        .replace("{{TITLE}}", &title)
        .replace("{{CONFIG}}", &escape_script(&config))
        .replace("{{VERSION}}", env!("CARGO_PKG_VERSION"))
}

/// Self-contained page around an already rendered SVG, for `render --format html`.
pub fn render_static_page(title: &str, svg: &str) -> String {
    // Drop the XML prolog so the SVG can be inlined.
    let svg = svg.find("<svg").map_or(svg, |start| &svg[start..]);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="generator" content="schemamap {}">
<title>{}</title>
<style>body {{ margin: 0; background: #f7f8fa; }} svg {{ display: block; margin: 16px auto; }}</style>
</head>
<body>
{}
</body>
</html>
"#,
        env!("CARGO_PKG_VERSION"),
        escape_html(title),
        svg
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Keep embedded JSON from closing the script element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="schemamap {{VERSION}}">
    <title>{{TITLE}}</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f7f8fa;
            color: #1f2933;
            overflow: hidden;
        }

        #container { display: flex; height: 100vh; }

        #viewport {
            flex: 1;
            position: relative;
            overflow: hidden;
            cursor: grab;
        }

        #viewport.dragging { cursor: grabbing; }

        #diagram { position: absolute; left: 0; top: 0; transform-origin: 0 0; }

        #sidebar {
            width: 280px;
            border-left: 1px solid #d9dee5;
            padding: 16px;
            overflow-y: auto;
            background: #fff;
        }

        h1 { font-size: 1.1em; margin-bottom: 12px; word-break: break-all; }
        h2 { font-size: 0.95em; margin: 16px 0 8px; }
        label { display: block; font-size: 0.9em; margin: 4px 0; }
        select { width: 100%; margin: 4px 0; }
        #status { font-size: 0.85em; color: #6b7280; margin-top: 8px; }
        #status.error { color: #b91c1c; }
        #details { font-size: 0.85em; }
        #details li { list-style: none; margin: 2px 0; }

        g.node.selected polygon { stroke: #2563eb; stroke-width: 2; }
        g.edge.selected path { stroke: #2563eb; stroke-width: 2.5; }
        g.edge.selected polygon { fill: #2563eb; stroke: #2563eb; }
        g.node, g.edge { cursor: pointer; }
    </style>
</head>
<body>
    <div id="container">
        <div id="viewport"><div id="diagram"></div></div>
        <div id="sidebar">
            <h1 id="title">{{TITLE}}</h1>
            <h2>Display</h2>
            <label>Root <select id="root-type"></select></label>
            <label><input type="checkbox" data-option="skipRelay"> Skip Relay</label>
            <label><input type="checkbox" data-option="skipDeprecated"> Skip deprecated</label>
            <label><input type="checkbox" data-option="sortByAlphabet"> Sort by alphabet</label>
            <label><input type="checkbox" data-option="showLeafFields"> Show leaf fields</label>
            <label><input type="checkbox" data-option="hideRoot"> Hide root</label>
            <button id="refresh">Refresh</button>
            <div id="status"></div>
            <h2>Selection</h2>
            <ul id="details"></ul>
        </div>
    </div>

    <script>
        const CONFIG = {{CONFIG}};
        const viewport = document.getElementById('viewport');
        const diagram = document.getElementById('diagram');
        let snapshot = null;
        let renderedGeneration = null;

        function post(path, body) {
            return fetch(path, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(body || {}),
            });
        }

        function applySnapshot(next) {
            snapshot = next;
            const render = next.render;
            if (render && render.generation !== renderedGeneration) {
                diagram.innerHTML = render.markup;
                renderedGeneration = render.generation;
            }

            const t = next.viewport.transform;
            diagram.style.transform = `translate(${t.panX}px, ${t.panY}px) scale(${t.zoom})`;

            diagram.querySelectorAll('g.selected').forEach(el => el.classList.remove('selected'));
            const sel = next.selection;
            for (const id of [sel.selectedTypeId, sel.selectedEdgeId]) {
                if (!id) continue;
                const el = document.getElementById(id);
                if (el) el.classList.add('selected');
            }

            for (const input of document.querySelectorAll('input[data-option]')) {
                input.checked = !!next.options[input.dataset.option];
            }
            updateRoots(next);
            updateStatus(next);
            updateDetails(next);
        }

        function updateRoots(next) {
            const select = document.getElementById('root-type');
            const graph = next.graph;
            if (!graph) return;
            const names = graph.nodes.map(n => n.id);
            const current = next.options.rootType || graph.metadata.root;
            if (!names.includes(current)) names.unshift(current);
            select.innerHTML = names
                .map(n => `<option value="${n}"${n === current ? ' selected' : ''}>${n}</option>`)
                .join('');
        }

        function updateStatus(next) {
            const status = document.getElementById('status');
            status.classList.remove('error');
            const state = next.state;
            if (state.status === 'error') {
                status.classList.add('error');
                status.textContent = state.detail.message;
            } else if (next.layoutError) {
                status.classList.add('error');
                status.textContent = next.layoutError;
            } else if (state.status === 'fetching') {
                status.textContent = 'Loading schema...';
            } else if (next.rendering) {
                status.textContent = 'Rendering...';
            } else {
                status.textContent = '';
            }
        }

        function updateDetails(next) {
            const details = document.getElementById('details');
            const id = next.selection.selectedTypeId;
            const node = id && next.graph && next.graph.nodes.find(n => n.id === id);
            if (!node) {
                details.innerHTML = '<li>Nothing selected</li>';
                return;
            }
            const rows = node.fields.map(f => {
                const name = f.deprecated ? `<s>${f.name}</s>` : f.name;
                const link = f.target ? ` <a href="#" data-focus="${f.target}">&rarr;</a>` : '';
                return `<li>${name}: ${f.type_label}${link}</li>`;
            });
            details.innerHTML = `<li><b>${node.id}</b> (${node.kind})</li>` + rows.join('');
        }

        async function refreshSnapshot() {
            const response = await fetch('/api/snapshot');
            applySnapshot(await response.json());
        }

        // Clicks resolve to the nearest node or edge group; anything else is background.
        viewport.addEventListener('click', (event) => {
            if (dragMoved) return;
            const group = event.target.closest('g.node, g.edge');
            if (group) post('/api/click', { id: group.id });
        });

        document.getElementById('details').addEventListener('click', (event) => {
            const focus = event.target.dataset.focus;
            if (!focus) return;
            event.preventDefault();
            post('/api/focus', { id: focus });
        });

        let dragStart = null;
        let dragMoved = false;
        viewport.addEventListener('mousedown', (event) => {
            dragStart = { x: event.clientX, y: event.clientY };
            dragMoved = false;
        });
        window.addEventListener('mousemove', (event) => {
            if (!dragStart) return;
            const dx = event.clientX - dragStart.x;
            const dy = event.clientY - dragStart.y;
            if (Math.abs(dx) + Math.abs(dy) < 3) return;
            dragMoved = true;
            viewport.classList.add('dragging');
            dragStart = { x: event.clientX, y: event.clientY };
            post('/api/pan', { dx, dy });
        });
        window.addEventListener('mouseup', () => {
            dragStart = null;
            viewport.classList.remove('dragging');
        });

        viewport.addEventListener('wheel', (event) => {
            event.preventDefault();
            const rect = viewport.getBoundingClientRect();
            const factor = event.deltaY < 0 ? 1.1 : 1 / 1.1;
            post('/api/zoom', { factor, x: event.clientX - rect.left, y: event.clientY - rect.top });
        }, { passive: false });

        function sendSize() {
            post('/api/resize', { width: viewport.clientWidth, height: viewport.clientHeight });
        }
        window.addEventListener('resize', sendSize);

        for (const input of document.querySelectorAll('input[data-option]')) {
            input.addEventListener('change', () => {
                post('/api/options', { [input.dataset.option]: input.checked });
            });
        }
        document.getElementById('root-type').addEventListener('change', (event) => {
            post('/api/options', { rootType: event.target.value });
        });
        document.getElementById('refresh').addEventListener('click', () => post('/api/refresh'));

        // Server-Sent Events carry the snapshot version; the body is fetched separately.
        function setupSSE() {
            const evtSource = new EventSource('/api/events');
            evtSource.addEventListener('update', () => refreshSnapshot());
            evtSource.onerror = () => {
                console.log('SSE connection lost, reconnecting...');
            };
        }

        console.log('schemamap', CONFIG);
        sendSize();
        refreshSnapshot();
        setupSSE();
    </script>
</body>
</html>
"##;
