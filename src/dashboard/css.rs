//! Dashboard CSS styles
//!
//! Contains all styling for the price dashboard UI.
//! Uses CSS custom properties (variables) for theming. Charts sit on white
//! cards so the heatmap colours read the same as in exported images.

pub const STYLES: &str = r"
* { box-sizing: border-box; margin: 0; padding: 0; }

:root {
    --bg: #0d1117;
    --card: #161b22;
    --border: #30363d;
    --text: #c9d1d9;
    --text-dim: #8b949e;
    --green: #3fb950;
    --red: #f85149;
    --blue: #58a6ff;
    --yellow: #d29922;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    padding: 20px;
    min-height: 100vh;
}

.container { max-width: 1400px; margin: 0 auto; }

.hidden { display: none !important; }

/* Header */
header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 24px;
    padding-bottom: 16px;
    border-bottom: 1px solid var(--border);
}

h1 { font-size: 24px; font-weight: 600; }

.header-controls {
    display: flex;
    align-items: center;
    gap: 12px;
}

.refresh-time { font-size: 12px; color: var(--text-dim); }

/* Buttons */
.btn {
    padding: 8px 16px;
    border-radius: 6px;
    border: none;
    font-size: 13px;
    font-weight: 500;
    cursor: pointer;
    transition: all 0.2s;
}

.btn:disabled { opacity: 0.6; cursor: not-allowed; }
.btn-secondary { background: var(--border); color: var(--text); }
.btn-secondary:hover:not(:disabled) { background: #3d444d; }

/* Layout */
.layout {
    display: grid;
    grid-template-columns: 280px 1fr;
    gap: 16px;
    align-items: start;
}

main { display: flex; flex-direction: column; gap: 16px; min-width: 0; }

/* Cards */
.card {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 12px;
    padding: 20px;
}

.card-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 16px;
}

.card-title {
    font-size: 14px;
    color: var(--text-dim);
    text-transform: uppercase;
    letter-spacing: 0.5px;
}

.chart-card { background: #fff; padding: 8px; }

/* Controls */
.field { display: flex; flex-direction: column; gap: 6px; margin-bottom: 16px; }
.field-label { font-size: 11px; color: var(--text-dim); text-transform: uppercase; }
.field-hint { font-size: 11px; color: var(--yellow); }

.field input,
.field select {
    background: var(--bg);
    color: var(--text);
    border: 1px solid var(--border);
    border-radius: 6px;
    padding: 6px 8px;
    font-size: 13px;
}

.check { display: flex; align-items: center; gap: 8px; font-size: 13px; margin-bottom: 8px; }

.region-grid {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 4px 8px;
    font-size: 12px;
}

.region-grid label { display: flex; align-items: center; gap: 4px; cursor: pointer; }

/* Summary Banner */
.banner {
    padding: 12px 16px;
    border-radius: 8px;
    font-size: 14px;
    display: flex;
    justify-content: space-between;
    align-items: center;
    gap: 12px;
}

.banner-warning { background: rgba(210, 153, 34, 0.15); color: var(--yellow); }
.banner-error { background: rgba(248, 81, 73, 0.15); color: var(--red); }

/* Status Trail */
.status-list { list-style: none; font-size: 12px; }
.status-list li { padding: 2px 0; }
.status-success { color: var(--green); }
.status-warning { color: var(--yellow); }
.status-error { color: var(--red); }

/* Price Table */
.table-wrap { overflow-x: auto; max-height: 600px; }

#priceTable { width: 100%; border-collapse: collapse; font-size: 13px; }

#priceTable th,
#priceTable td {
    text-align: right;
    padding: 6px 8px;
    border-bottom: 1px solid var(--border);
    white-space: nowrap;
}

#priceTable th {
    color: var(--text-dim);
    font-weight: 500;
    font-size: 12px;
    text-transform: uppercase;
    position: sticky;
    top: 0;
    background: var(--card);
}

#priceTable td:first-child,
#priceTable th:first-child { text-align: left; }

.negative { color: var(--green); }
.missing { color: var(--text-dim); }

/* Responsive */
@media (max-width: 900px) {
    .layout { grid-template-columns: 1fr; }
    header { flex-direction: column; gap: 12px; }
}
";
