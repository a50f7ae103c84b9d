use crate::config::Config;

pub fn render_dashboard(config: &Config) -> String {
    INDEX_HTML
        .replace("{{POLL_MS}}", &config.poll_interval.as_millis().to_string())
        .replace("{{WINDOW_DAYS}}", &config.history_window_days.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>EarthMC Tracker</title>
  <style>
    :root {
      --bg-1: #10151d;
      --bg-2: #1b2836;
      --ink: #e8edf2;
      --muted: #8da0b3;
      --accent: #5dd39e;
      --accent-2: #4aa3df;
      --danger: #e06c5b;
      --card: rgba(28, 38, 51, 0.92);
      --line: rgba(141, 160, 179, 0.18);
      --shadow: 0 18px 48px rgba(4, 8, 14, 0.5);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top right, var(--bg-2), transparent 55%),
        linear-gradient(160deg, var(--bg-1), #0b1017 70%);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 28px 18px 48px;
      display: grid;
      justify-items: center;
    }

    .app {
      width: min(1100px, 100%);
      display: grid;
      gap: 22px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: baseline;
      justify-content: space-between;
      gap: 10px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
      letter-spacing: 0.02em;
    }

    h1 span {
      color: var(--accent);
    }

    .meta-line {
      color: var(--muted);
      font-size: 0.9rem;
      display: flex;
      gap: 14px;
      flex-wrap: wrap;
    }

    .tiles {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 14px;
    }

    .tile {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 14px;
      padding: 16px;
      box-shadow: var(--shadow);
      display: grid;
      gap: 6px;
    }

    .tile .label {
      font-size: 0.78rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .tile .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .tile .delta {
      font-size: 0.85rem;
      color: var(--muted);
    }

    .tile .delta.up {
      color: var(--accent);
    }

    .tile .delta.down {
      color: var(--danger);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(141, 160, 179, 0.1);
      border-radius: 999px;
      width: fit-content;
    }

    .tab {
      background: transparent;
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font-size: 0.92rem;
      font-weight: 600;
      color: var(--muted);
      cursor: pointer;
    }

    .tab.active {
      background: var(--card);
      color: var(--ink);
      box-shadow: 0 6px 14px rgba(4, 8, 14, 0.4);
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .controls input,
    .controls select,
    .controls button {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 10px;
      color: var(--ink);
      padding: 9px 12px;
      font-size: 0.92rem;
    }

    .controls input {
      flex: 1 1 220px;
    }

    .controls button {
      cursor: pointer;
    }

    .controls .count {
      color: var(--muted);
      font-size: 0.88rem;
      margin-left: auto;
    }

    .banner {
      display: none;
      background: rgba(224, 108, 91, 0.12);
      border: 1px solid rgba(224, 108, 91, 0.45);
      color: #f2b1a6;
      border-radius: 10px;
      padding: 10px 14px;
      font-size: 0.9rem;
    }

    .banner.visible {
      display: block;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));
      gap: 12px;
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 14px;
      display: grid;
      gap: 8px;
    }

    .card .name {
      font-weight: 600;
      font-size: 1.02rem;
      display: flex;
      align-items: center;
      gap: 8px;
    }

    .card .row {
      display: flex;
      justify-content: space-between;
      font-size: 0.86rem;
      color: var(--muted);
    }

    .card .row b {
      color: var(--ink);
      font-weight: 500;
    }

    .badge {
      font-size: 0.7rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      border-radius: 999px;
      padding: 2px 8px;
      border: 1px solid var(--line);
      color: var(--muted);
    }

    .badge.capital {
      color: #f0c66b;
      border-color: rgba(240, 198, 107, 0.5);
    }

    .badge.online {
      color: var(--accent);
      border-color: rgba(93, 211, 158, 0.5);
    }

    .badge.ruined {
      color: var(--danger);
      border-color: rgba(224, 108, 91, 0.5);
    }

    .lookup {
      display: flex;
      gap: 10px;
      flex-wrap: wrap;
    }

    .lookup input {
      flex: 1 1 220px;
    }

    .lookup .result {
      width: 100%;
    }

    .panel {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 14px;
      padding: 18px;
      box-shadow: var(--shadow);
      display: grid;
      gap: 14px;
    }

    .panel h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    .panel table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.88rem;
    }

    .panel th,
    .panel td {
      text-align: left;
      padding: 7px 6px;
      border-bottom: 1px solid var(--line);
    }

    .panel th {
      color: var(--muted);
      font-weight: 500;
      text-transform: uppercase;
      font-size: 0.72rem;
      letter-spacing: 0.1em;
    }

    .panel td.err {
      color: var(--danger);
    }

    #chart {
      width: 100%;
      height: 240px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 2.5;
    }

    .chart-point {
      fill: var(--bg-1);
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: var(--line);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .metric-tabs {
      display: flex;
      gap: 6px;
    }

    .metric-tabs button {
      background: transparent;
      border: 1px solid var(--line);
      border-radius: 999px;
      color: var(--muted);
      padding: 5px 12px;
      font-size: 0.82rem;
      cursor: pointer;
    }

    .metric-tabs button.active {
      color: var(--ink);
      border-color: var(--accent);
    }

    .empty {
      color: var(--muted);
      font-size: 0.92rem;
      padding: 18px 4px;
    }

    @media (max-width: 640px) {
      .controls .count {
        margin-left: 0;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>EarthMC <span>Tracker</span></h1>
        <div class="meta-line">
          <span id="clock">--:--:--</span>
          <span id="refreshed">never refreshed</span>
          <span id="poll-note">history window {{WINDOW_DAYS}} days</span>
        </div>
      </div>
      <button id="refresh-btn" class="tab active" type="button">Refresh now</button>
    </header>

    <section class="tiles" id="tiles">
      <div class="tile">
        <span class="label">Online</span>
        <span class="value" id="tile-online">--</span>
        <span class="delta" id="delta-online"></span>
      </div>
      <div class="tile">
        <span class="label">Residents</span>
        <span class="value" id="tile-residents">--</span>
        <span class="delta" id="delta-residents"></span>
      </div>
      <div class="tile">
        <span class="label">Towns</span>
        <span class="value" id="tile-towns">--</span>
        <span class="delta" id="delta-towns"></span>
      </div>
      <div class="tile">
        <span class="label">Nations</span>
        <span class="value" id="tile-nations">--</span>
        <span class="delta" id="delta-nations"></span>
      </div>
    </section>

    <nav class="tabs" role="tablist">
      <button class="tab active" data-tab="towns" type="button">Towns</button>
      <button class="tab" data-tab="nations" type="button">Nations</button>
      <button class="tab" data-tab="players" type="button">Players</button>
      <button class="tab" data-tab="server" type="button">Server</button>
    </nav>

    <div class="banner" id="banner"></div>

    <section id="list-view">
      <div class="controls">
        <input id="search" type="search" placeholder="Search by name, mayor, nation..." />
        <select id="sort"></select>
        <button id="order" type="button" data-order="">Auto order</button>
        <span class="count" id="count"></span>
      </div>
      <div class="grid" id="grid"></div>
      <div class="empty" id="list-empty" hidden>Nothing here yet. Waiting for the first refresh.</div>
    </section>

    <section id="player-view" hidden>
      <div class="panel">
        <h2>Player lookup</h2>
        <form class="lookup" id="lookup-form">
          <input id="lookup-name" type="text" placeholder="Exact player name" />
          <button type="submit" class="tab active">Look up</button>
          <div class="result" id="lookup-result"></div>
        </form>
      </div>
    </section>

    <section id="server-view" hidden>
      <div class="panel">
        <h2>Server</h2>
        <table>
          <tbody id="server-table"></tbody>
        </table>
      </div>
      <div class="panel">
        <h2>Data sections</h2>
        <table>
          <thead>
            <tr><th>Section</th><th>Items</th><th>Refreshed</th><th>Error</th></tr>
          </thead>
          <tbody id="sections-table"></tbody>
        </table>
      </div>
      <div class="panel">
        <div class="controls">
          <h2 style="margin-right: auto">History, last 7 days</h2>
          <div class="metric-tabs" id="metric-tabs">
            <button data-metric="towns" class="active" type="button">Towns</button>
            <button data-metric="nations" type="button">Nations</button>
            <button data-metric="residents" type="button">Residents</button>
            <button data-metric="online" type="button">Online</button>
          </div>
        </div>
        <svg id="chart" viewBox="0 0 600 240" role="img" aria-label="History chart"></svg>
      </div>
    </section>
  </main>

  <script>
    const POLL_MS = Number('{{POLL_MS}}') || 300000;

    const LIST_TABS = {
      towns: {
        sorts: [['name', 'Name'], ['residents', 'Residents'], ['townblocks', 'Town blocks'], ['balance', 'Balance']]
      },
      nations: {
        sorts: [['name', 'Name'], ['towns', 'Towns'], ['residents', 'Residents'], ['balance', 'Balance']]
      },
      players: {
        sorts: [['name', 'Name'], ['balance', 'Balance'], ['lastonline', 'Last online']]
      }
    };

    const el = (id) => document.getElementById(id);
    const banner = el('banner');
    const grid = el('grid');
    const searchEl = el('search');
    const sortEl = el('sort');
    const orderEl = el('order');

    let activeTab = 'towns';
    let activeMetric = 'towns';
    let historyData = null;
    let searchTimer = null;

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (ch) => ({
        '&': '&amp;',
        '<': '&lt;',
        '>': '&gt;',
        '"': '&quot;',
        "'": '&#39;'
      })[ch]);

    const fmt = (value) => Number(value).toLocaleString('en-US');
    const gold = (value) => fmt(Math.round(Number(value))) + 'G';

    const setBanner = (message) => {
      banner.textContent = message || '';
      banner.classList.toggle('visible', Boolean(message));
    };

    const fetchJson = async (path, options) => {
      const res = await fetch(path, options);
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed (' + res.status + ')');
      }
      return res.json();
    };

    const renderTownCard = (town) => `
      <div class="card">
        <div class="name">${escapeHtml(town.name)}
          ${town.is_capital ? '<span class="badge capital">Capital</span>' : ''}
          ${town.is_ruined ? '<span class="badge ruined">Ruined</span>' : ''}
          ${town.is_open ? '<span class="badge">Open</span>' : ''}
        </div>
        <div class="row"><span>Mayor</span><b>${escapeHtml(town.mayor)}</b></div>
        <div class="row"><span>Nation</span><b>${escapeHtml(town.nation)}</b></div>
        <div class="row"><span>Residents</span><b>${fmt(town.residents)}</b></div>
        <div class="row"><span>Claims</span><b>${fmt(town.town_blocks)} / ${fmt(town.max_town_blocks)}</b></div>
        <div class="row"><span>Balance</span><b>${gold(town.balance)}</b></div>
      </div>`;

    const renderNationCard = (nation) => `
      <div class="card">
        <div class="name">${escapeHtml(nation.name)}
          ${nation.is_open ? '<span class="badge">Open</span>' : ''}
          ${nation.is_neutral ? '<span class="badge">Neutral</span>' : ''}
        </div>
        <div class="row"><span>King</span><b>${escapeHtml(nation.king)}</b></div>
        <div class="row"><span>Capital</span><b>${escapeHtml(nation.capital)}</b></div>
        <div class="row"><span>Towns</span><b>${fmt(nation.towns)}</b></div>
        <div class="row"><span>Residents</span><b>${fmt(nation.residents)}</b></div>
        <div class="row"><span>Balance</span><b>${gold(nation.balance)}</b></div>
      </div>`;

    const renderPlayerCard = (player) => `
      <div class="card">
        <div class="name">${escapeHtml(player.name)}
          ${player.is_online ? '<span class="badge online">Online</span>' : ''}
          ${player.is_king ? '<span class="badge capital">King</span>' : ''}
          ${player.is_mayor ? '<span class="badge">Mayor</span>' : ''}
        </div>
        <div class="row"><span>Town</span><b>${escapeHtml(player.town)}</b></div>
        <div class="row"><span>Nation</span><b>${escapeHtml(player.nation)}</b></div>
        <div class="row"><span>Balance</span><b>${gold(player.balance)}</b></div>
        <div class="row"><span>Last online</span><b>${player.last_online ? new Date(player.last_online).toLocaleString() : 'Unknown'}</b></div>
      </div>`;

    const RENDERERS = {
      towns: renderTownCard,
      nations: renderNationCard,
      players: renderPlayerCard
    };

    const fillSortOptions = () => {
      const config = LIST_TABS[activeTab];
      sortEl.innerHTML = config.sorts
        .map(([key, label]) => '<option value="' + key + '">' + label + '</option>')
        .join('');
    };

    const loadList = async () => {
      const params = new URLSearchParams();
      const q = searchEl.value.trim();
      if (q) params.set('q', q);
      if (sortEl.value) params.set('sort', sortEl.value);
      if (orderEl.dataset.order) params.set('order', orderEl.dataset.order);

      try {
        const data = await fetchJson('/api/' + activeTab + '?' + params.toString());
        setBanner(data.error);
        el('count').textContent = data.items.length + ' of ' + data.total;
        el('refreshed').textContent = data.refreshed_at
          ? 'refreshed ' + new Date(data.refreshed_at).toLocaleTimeString()
          : 'never refreshed';
        grid.innerHTML = data.items.map(RENDERERS[activeTab]).join('');
        el('list-empty').hidden = data.items.length > 0;
      } catch (err) {
        setBanner(err.message);
      }
    };

    const loadStatus = async () => {
      try {
        const data = await fetchJson('/api/status');
        const stats = data.server ? data.server.stats : null;
        el('tile-online').textContent = stats ? fmt(stats.numOnlinePlayers) : '--';
        el('tile-residents').textContent = stats ? fmt(stats.numResidents) : '--';
        el('tile-towns').textContent = stats ? fmt(stats.numTowns) : '--';
        el('tile-nations').textContent = stats ? fmt(stats.numNations) : '--';

        const serverRows = [];
        if (data.server) {
          serverRows.push(['Version', data.server.version || 'Unknown']);
          serverRows.push(['Moon phase', data.server.moonPhase || 'Unknown']);
          if (data.server.voteParty) {
            serverRows.push(['Vote party', fmt(data.server.voteParty.numRemaining) + ' votes remaining']);
          }
          if (stats) {
            serverRows.push(['Capacity', fmt(stats.numOnlinePlayers) + ' / ' + fmt(stats.maxPlayers)]);
          }
        } else {
          serverRows.push(['Server', 'No data yet']);
        }
        el('server-table').innerHTML = serverRows
          .map(([key, value]) => '<tr><th>' + key + '</th><td>' + escapeHtml(value) + '</td></tr>')
          .join('');

        el('sections-table').innerHTML = data.sections
          .map((section) =>
            '<tr><td>' + section.name + '</td><td>' + fmt(section.count) + '</td><td>' +
            (section.refreshed_at ? new Date(section.refreshed_at).toLocaleTimeString() : 'never') +
            '</td><td class="err">' + escapeHtml(section.error || '') + '</td></tr>')
          .join('');

        const failing = data.sections.filter((section) => section.error);
        if (failing.length && activeTab === 'server') {
          setBanner(failing.length + ' section(s) failing: ' + failing.map((s) => s.name).join(', '));
        }
      } catch (err) {
        setBanner(err.message);
      }
    };

    const deltaText = (id, value) => {
      const node = el(id);
      if (value > 0) {
        node.textContent = '+' + fmt(value) + ' today';
        node.className = 'delta up';
      } else if (value < 0) {
        node.textContent = fmt(value) + ' today';
        node.className = 'delta down';
      } else {
        node.textContent = '';
        node.className = 'delta';
      }
    };

    const renderChart = () => {
      const chart = el('chart');
      if (!historyData) return;
      const points = historyData.overview.last_7_days.map((day) => ({
        label: day.date.slice(5),
        value: day[activeMetric] || 0
      }));
      if (!points.length) {
        chart.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No history yet</text>';
        return;
      }

      const width = 600;
      const height = 240;
      const paddingX = 48;
      const paddingY = 32;
      const top = 20;

      const values = points.map((point) => point.value);
      let min = Math.min(...values);
      let max = Math.max(...values);
      if (min === max) {
        min -= 1;
        max += 1;
      }

      const range = max - min;
      const xStep = points.length > 1 ? (width - paddingX * 2) / (points.length - 1) : 0;
      const scaleY = (height - top - paddingY) / range;
      const x = (index) => paddingX + index * xStep;
      const y = (value) => height - paddingY - (value - min) * scaleY;

      const path = points
        .map((point, index) => (index === 0 ? 'M' : 'L') + ' ' + x(index).toFixed(2) + ' ' + y(point.value).toFixed(2))
        .join(' ');

      const ticks = 4;
      let parts = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + (range * i) / ticks;
        const yPos = y(value);
        parts += '<line class="chart-grid" x1="' + paddingX + '" y1="' + yPos + '" x2="' + (width - paddingX) + '" y2="' + yPos + '" />';
        parts += '<text class="chart-label" x="' + (paddingX - 10) + '" y="' + (yPos + 4) + '" text-anchor="end">' + fmt(Math.round(value)) + '</text>';
      }

      parts += '<path class="chart-line" d="' + path + '" />';
      points.forEach((point, index) => {
        parts += '<circle class="chart-point" cx="' + x(index) + '" cy="' + y(point.value) + '" r="4" />';
        parts += '<text class="chart-label" x="' + x(index) + '" y="' + (height - paddingY + 18) + '" text-anchor="middle">' + point.label + '</text>';
      });

      chart.innerHTML = parts;
    };

    const loadHistory = async () => {
      try {
        historyData = await fetchJson('/api/history');
        deltaText('delta-towns', historyData.overview.day_change.towns);
        deltaText('delta-nations', historyData.overview.day_change.nations);
        deltaText('delta-residents', historyData.overview.day_change.residents);
        deltaText('delta-online', historyData.overview.day_change.online);
        renderChart();
      } catch (err) {
        setBanner(err.message);
      }
    };

    const refreshAll = () => {
      loadStatus();
      loadHistory();
      if (LIST_TABS[activeTab]) loadList();
    };

    const setActiveTab = (tab) => {
      activeTab = tab;
      document.querySelectorAll('.tabs .tab').forEach((button) => {
        button.classList.toggle('active', button.dataset.tab === tab);
      });
      el('list-view').hidden = !LIST_TABS[tab];
      el('player-view').hidden = tab !== 'players';
      el('server-view').hidden = tab !== 'server';
      setBanner('');
      if (LIST_TABS[tab]) {
        fillSortOptions();
        loadList();
      } else {
        loadStatus();
        loadHistory();
      }
    };

    document.querySelectorAll('.tabs .tab').forEach((button) => {
      button.addEventListener('click', () => setActiveTab(button.dataset.tab));
    });

    el('metric-tabs').querySelectorAll('button').forEach((button) => {
      button.addEventListener('click', () => {
        activeMetric = button.dataset.metric;
        el('metric-tabs').querySelectorAll('button').forEach((other) => {
          other.classList.toggle('active', other === button);
        });
        renderChart();
      });
    });

    searchEl.addEventListener('input', () => {
      clearTimeout(searchTimer);
      searchTimer = setTimeout(loadList, 250);
    });
    sortEl.addEventListener('change', loadList);

    orderEl.addEventListener('click', () => {
      const next = { '': 'asc', asc: 'desc', desc: '' }[orderEl.dataset.order];
      orderEl.dataset.order = next;
      orderEl.textContent = next ? (next === 'asc' ? 'Ascending' : 'Descending') : 'Auto order';
      loadList();
    });

    el('refresh-btn').addEventListener('click', async () => {
      el('refresh-btn').textContent = 'Refreshing...';
      try {
        await fetchJson('/api/refresh', { method: 'POST' });
        refreshAll();
      } catch (err) {
        setBanner(err.message);
      } finally {
        el('refresh-btn').textContent = 'Refresh now';
      }
    });

    el('lookup-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const name = el('lookup-name').value.trim();
      if (!name) return;
      el('lookup-result').innerHTML = '<div class="empty">Looking up ' + escapeHtml(name) + '...</div>';
      try {
        const player = await fetchJson('/api/players/' + encodeURIComponent(name));
        el('lookup-result').innerHTML = renderPlayerCard(player);
      } catch (err) {
        el('lookup-result').innerHTML = '<div class="empty">' + escapeHtml(err.message) + '</div>';
      }
    });

    setInterval(() => {
      el('clock').textContent = new Date().toLocaleTimeString();
    }, 1000);

    setInterval(refreshAll, POLL_MS);
    el('poll-note').textContent =
      'auto-refresh every ' + Math.max(1, Math.round(POLL_MS / 60000)) + ' min, ' +
      el('poll-note').textContent;

    fillSortOptions();
    refreshAll();
  </script>
</body>
</html>
"#;
