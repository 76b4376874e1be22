//! Dashboard HTML template
//!
//! Contains the main page structure including:
//! - Header with the Refresh button
//! - Query controls (date, regions, resolution, colour scale, toggles)
//! - Summary banner and per-region status trail
//! - Heatmap, line chart and price table

pub const TEMPLATE: &str = r#"
    <div class="container">
        <header>
            <div>
                <h1>⚡ Day-Ahead Electricity Prices</h1>
                <span class="refresh-time" id="refreshTime">Loading...</span>
            </div>
            <div class="header-controls">
                <button class="btn btn-secondary" onclick="refreshData()" id="refreshBtn">🔄 Refresh</button>
            </div>
        </header>

        <div class="layout">
            <!-- Query Controls -->
            <aside class="card controls">
                <div class="card-header">
                    <span class="card-title">Query</span>
                </div>

                <label class="field">
                    <span class="field-label">Delivery day</span>
                    <input type="date" id="dateInput">
                </label>

                <div class="field">
                    <span class="field-label">Regions</span>
                    <div class="region-grid" id="regionGrid"></div>
                </div>

                <label class="field">
                    <span class="field-label">Resolution</span>
                    <select id="resolutionSelect">
                        <option value="60min">60 min</option>
                        <option value="15min">15 min</option>
                    </select>
                    <span class="field-hint" id="resolutionHint"></span>
                </label>

                <label class="field">
                    <span class="field-label">Colour scale</span>
                    <select id="colorscaleSelect"></select>
                </label>

                <label class="check">
                    <input type="checkbox" id="reverseToggle"> Reverse colours
                </label>
                <label class="check">
                    <input type="checkbox" id="heatmapToggle" checked> Show heatmap
                </label>
                <label class="check">
                    <input type="checkbox" id="tableToggle" checked> Show table
                </label>
            </aside>

            <main>
                <!-- Summary and Status Trail -->
                <div class="banner hidden" id="summaryBanner"></div>
                <ul class="status-list" id="statusList"></ul>

                <div class="card chart-card hidden" id="heatmapCard">
                    <div id="heatmap"></div>
                </div>

                <div class="card chart-card hidden" id="lineCard">
                    <div id="lineChart"></div>
                </div>

                <div class="card hidden" id="tableCard">
                    <div class="card-header">
                        <span class="card-title">Prices [€/MWh]</span>
                    </div>
                    <div class="table-wrap">
                        <table id="priceTable"></table>
                    </div>
                </div>
            </main>
        </div>
    </div>
"#;
