//! Dashboard JavaScript
//!
//! Client-side logic for the price dashboard:
//! - Loads picker contents from `/api/options`
//! - Fetches the dashboard view from `/api/prices` on every control change
//! - Draws heatmap and line chart with Plotly, the table as plain HTML
//! - Refresh bumps a cache epoch scoped to a random per-session id

pub const SCRIPT: &str = r#"
// ============================================================================
// Configuration
// ============================================================================
const CONFIG = {
    apiBase: '',
    epochKey: 'dayahead.epoch',
    sessionKey: 'dayahead.session',
    chartHeight: 800
};

// ============================================================================
// State
// ============================================================================
let options = null;
let requestSeq = 0;

function currentEpoch() {
    return parseInt(sessionStorage.getItem(CONFIG.epochKey) || '0', 10);
}

function sessionId() {
    let id = sessionStorage.getItem(CONFIG.sessionKey);
    if (!id) {
        id = (self.crypto && crypto.randomUUID)
            ? crypto.randomUUID()
            : Date.now().toString(36) + '-' + Math.random().toString(36).slice(2);
        sessionStorage.setItem(CONFIG.sessionKey, id);
    }
    return id;
}

function bumpEpoch() {
    sessionStorage.setItem(CONFIG.epochKey, String(currentEpoch() + 1));
}

// ============================================================================
// API Functions
// ============================================================================
async function fetchJSON(endpoint) {
    try {
        const res = await fetch(CONFIG.apiBase + endpoint);
        return await res.json();
    } catch (e) {
        console.error(`Error fetching ${endpoint}:`, e);
        return null;
    }
}

// ============================================================================
// Formatting Utilities
// ============================================================================
function escapeHTML(value) {
    return String(value)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;');
}

function formatPrice(value) {
    if (value == null || isNaN(value)) return '–';
    return parseFloat(value).toFixed(2);
}

function show(id, visible) {
    document.getElementById(id).classList.toggle('hidden', !visible);
}

// ============================================================================
// Controls
// ============================================================================
function selectedRegions() {
    return Array.from(document.querySelectorAll('#regionGrid input:checked')).map(el => el.value);
}

function buildControls(opts) {
    const params = new URLSearchParams(window.location.search);

    const dateInput = document.getElementById('dateInput');
    dateInput.max = opts.max_date;
    dateInput.value = params.get('date') || opts.default_date;

    const chosen = params.has('regions')
        ? params.get('regions').split(',').filter(Boolean)
        : opts.default_regions;
    document.getElementById('regionGrid').innerHTML = opts.zones.map(z => `
        <label title="${escapeHTML(z.name)}">
            <input type="checkbox" value="${z.code}" ${chosen.includes(z.code) ? 'checked' : ''}>
            ${z.code}
        </label>`).join('');

    const scales = opts.colorscales;
    const chosenScale = params.get('colorscale') || scales.default;
    const optionList = names => names.map(n =>
        `<option value="${n}" ${n === chosenScale ? 'selected' : ''}>${n}</option>`).join('');
    document.getElementById('colorscaleSelect').innerHTML =
        `<optgroup label="Diverging">${optionList(scales.diverging)}</optgroup>` +
        `<optgroup label="Sequential">${optionList(scales.sequential)}</optgroup>`;

    if (params.get('resolution')) {
        document.getElementById('resolutionSelect').value = params.get('resolution');
    }
    document.getElementById('reverseToggle').checked = params.get('reverse') === 'true';
    document.getElementById('heatmapToggle').checked = params.get('heatmap') !== 'false';
    document.getElementById('tableToggle').checked = params.get('table') !== 'false';

    document.querySelectorAll('.controls input, .controls select').forEach(el => {
        el.addEventListener('change', loadPrices);
    });
}

// 15-minute products only exist from the cutover day on
function syncResolution() {
    const date = document.getElementById('dateInput').value;
    const select = document.getElementById('resolutionSelect');
    const quarter = select.querySelector('option[value="15min"]');
    const available = !!date && date >= options.resolution_cutover;

    quarter.disabled = !available;
    if (!available) select.value = '60min';
    document.getElementById('resolutionHint').textContent = available
        ? ''
        : `15 min available from ${options.resolution_cutover}`;
}

function buildQuery() {
    const query = new URLSearchParams({
        date: document.getElementById('dateInput').value,
        regions: selectedRegions().join(','),
        resolution: document.getElementById('resolutionSelect').value,
        colorscale: document.getElementById('colorscaleSelect').value,
        reverse: document.getElementById('reverseToggle').checked,
        heatmap: document.getElementById('heatmapToggle').checked,
        table: document.getElementById('tableToggle').checked
    });
    history.replaceState(null, '', '?' + query.toString());
    query.set('epoch', currentEpoch());
    query.set('session', sessionId());
    return query;
}

// ============================================================================
// UI Update Functions
// ============================================================================
function updateTimestamp(text) {
    document.getElementById('refreshTime').textContent = text;
}

function updateBanner(level, message, refreshSuggested) {
    const banner = document.getElementById('summaryBanner');
    if (!message) {
        banner.classList.add('hidden');
        return;
    }
    banner.className = 'banner banner-' + (level === 'error' ? 'error' : 'warning');
    banner.innerHTML = `<span>${escapeHTML(message)}</span>` +
        (refreshSuggested ? '<button class="btn btn-secondary" onclick="refreshData()">🔄 Refresh data</button>' : '');
}

function updateStatusList(statuses) {
    document.getElementById('statusList').innerHTML = (statuses || []).map(s =>
        `<li class="status-${s.level}">${escapeHTML(s.message)}</li>`).join('');
}

function clearCharts() {
    ['heatmapCard', 'lineCard', 'tableCard'].forEach(id => show(id, false));
    Plotly.purge('heatmap');
    Plotly.purge('lineChart');
}

function fontOf(font, scale) {
    return { family: font.family, size: font.size * (scale || 1), color: font.color };
}

function renderHeatmap(view) {
    if (!view) {
        show('heatmapCard', false);
        Plotly.purge('heatmap');
        return;
    }
    show('heatmapCard', true);

    const colors = view.colors;
    const trace = {
        type: 'heatmap',
        z: view.z,
        x: view.x,
        y: view.y,
        colorscale: colors.colorscale,
        reversescale: colors.reversescale,
        zmin: colors.domain.zmin,
        zmax: colors.domain.zmax,
        colorbar: {
            title: { text: view.colorbar_title, font: fontOf(view.font) },
            tickfont: fontOf(view.font, 0.9)
        },
        hoverinfo: 'z+x+y'
    };
    if (colors.domain.zmid != null) trace.zmid = colors.domain.zmid;
    if (view.text) {
        trace.text = view.text;
        trace.texttemplate = '%{text}';
        trace.textfont = fontOf(view.font, 0.9);
    }

    const layout = {
        title: { text: view.title, x: 0.5, xanchor: 'center', font: fontOf(view.font, 1.3) },
        plot_bgcolor: 'white',
        paper_bgcolor: 'white',
        height: CONFIG.chartHeight,
        font: fontOf(view.font),
        xaxis: {
            tickmode: 'array',
            tickvals: view.x,
            ticktext: view.x_tick_text,
            title: { text: view.x_axis_title, font: fontOf(view.font, 1.1) },
            linecolor: view.font.color,
            gridcolor: 'lightgray'
        },
        yaxis: {
            type: 'category',
            autorange: 'reversed',
            tickmode: 'array',
            tickvals: view.y_tick_vals,
            ticktext: view.y_tick_text,
            linecolor: view.font.color,
            gridcolor: 'lightgray'
        }
    };

    Plotly.react('heatmap', [trace], layout, { responsive: true });
}

function renderLineChart(view) {
    if (!view) {
        show('lineCard', false);
        Plotly.purge('lineChart');
        return;
    }
    show('lineCard', true);

    const traces = view.series.map(s => ({
        type: 'scatter',
        mode: 'lines',
        line: { shape: 'hv' },
        name: s.name,
        x: view.x,
        y: s.y,
        connectgaps: false
    }));

    const layout = {
        title: { text: view.title, x: 0.5, xanchor: 'center', font: fontOf(view.font, 1.3) },
        plot_bgcolor: 'white',
        paper_bgcolor: 'white',
        font: fontOf(view.font),
        xaxis: { title: { text: view.x_axis_title }, gridcolor: 'lightgray' },
        yaxis: { title: { text: view.y_axis_title }, gridcolor: 'lightgray', zeroline: true },
        legend: { orientation: 'h' }
    };

    Plotly.react('lineChart', traces, layout, { responsive: true });
}

function renderTable(view) {
    if (!view) {
        show('tableCard', false);
        return;
    }
    show('tableCard', true);

    const head = '<thead><tr><th>Time</th>' +
        view.columns.map(c => `<th>${escapeHTML(c)}</th>`).join('') + '</tr></thead>';
    const body = '<tbody>' + view.rows.map((row, i) =>
        `<tr><td>${view.index[i]}</td>` + row.map(v => {
            const cls = v == null ? 'missing' : (v < 0 ? 'negative' : '');
            return `<td class="${cls}">${formatPrice(v)}</td>`;
        }).join('') + '</tr>').join('') + '</tbody>';

    document.getElementById('priceTable').innerHTML = head + body;
}

// ============================================================================
// Main Update Function
// ============================================================================
async function loadPrices() {
    if (!options) return;
    syncResolution();

    if (selectedRegions().length === 0) {
        clearCharts();
        updateStatusList([]);
        updateBanner('warning', 'Please select at least one region.', false);
        return;
    }

    const seq = ++requestSeq;
    const query = buildQuery();
    updateTimestamp(`Loading prices for ${query.get('date')}...`);

    const view = await fetchJSON('/api/prices?' + query.toString());
    if (seq !== requestSeq) return;  // a newer request is in flight

    if (!view || view.error) {
        clearCharts();
        updateStatusList([]);
        updateBanner('error', view ? view.message : 'Could not reach the price service.', false);
        updateTimestamp('Load failed');
        return;
    }

    const summary = view.summary;
    updateBanner(summary && summary.level, summary && summary.message, summary && summary.refresh_suggested);
    updateStatusList(view.statuses);
    renderHeatmap(view.heatmap);
    renderLineChart(view.line_chart);
    renderTable(view.table);
    updateTimestamp(`${view.date} · ${view.resolution} · updated ${new Date().toLocaleTimeString()}`);
}

// ============================================================================
// Button Actions
// ============================================================================
async function refreshData() {
    const btn = document.getElementById('refreshBtn');
    btn.disabled = true;
    btn.textContent = '⏳';

    bumpEpoch();
    await loadPrices();

    btn.disabled = false;
    btn.textContent = '🔄 Refresh';
}

// ============================================================================
// Initialization
// ============================================================================
(async function init() {
    options = await fetchJSON('/api/options');
    if (!options || options.error) {
        updateBanner('error', options ? options.message : 'Could not load dashboard options.', false);
        updateTimestamp('');
        return;
    }
    buildControls(options);
    await loadPrices();
})();
"#;
