use crate::server::api::{self, ApiError};
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(method: &str, path: &str, body: &str, state: &AppState) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    let result = match (method, path) {
        ("GET", "/") => {
            return HttpResponse {
                status_code: 200,
                status_text: "OK",
                content_type: "text/html; charset=utf-8",
                body: INDEX_HTML.to_string(),
            }
        }
        ("GET", "/api/health") => api::health_payload(state),
        ("GET", "/api/contestants") => api::contestants_payload(state),
        ("POST", "/api/tournament") => api::tournament_payload(body, state),
        _ => return error_response(404, "Not Found", "Route not found"),
    };

    match result {
        Ok(payload) => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body: payload,
        },
        Err(err) => api_error_response(&err),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    match err {
        ApiError::BadRequest(_) => error_response(400, "Bad Request", &err.to_string()),
        ApiError::UnknownSession(_) => error_response(404, "Not Found", &err.to_string()),
        ApiError::Data(_) => {
            tracing::warn!(error = %err, "data source failure");
            error_response(502, "Bad Gateway", &err.to_string())
        }
        ApiError::Tournament(_) => error_response(422, "Unprocessable Entity", &err.to_string()),
        ApiError::Serialize(_) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

pub(crate) fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Pokébracket</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    .grid { display: flex; flex-wrap: wrap; gap: 8px; }
    .mon { width: 96px; text-align: center; font-size: 0.8rem; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 120px; }
  </style>
</head>
<body>
  <h1>Pokébracket</h1>

  <div class="card">
    <strong>Contestants</strong>
    <div><button id="draw-btn">Draw a pool</button></div>
    <div id="pool" class="grid"></div>
  </div>

  <div class="card">
    <strong>Tournament</strong>
    <div><button id="run-btn" disabled>Run tournament</button></div>
    <h2 id="champion"></h2>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');
    const poolEl = document.getElementById('pool');
    const runBtn = document.getElementById('run-btn');
    let session = null;

    document.getElementById('draw-btn').addEventListener('click', async () => {
      output.textContent = 'Loading…';
      const response = await fetch('/api/contestants');
      const data = await response.json();
      if (!response.ok) { output.textContent = 'HTTP ' + response.status + '\n' + data.message; return; }
      session = data.session;
      poolEl.innerHTML = '';
      for (const mon of data.contestants) {
        const div = document.createElement('div');
        div.className = 'mon';
        div.innerHTML = (mon.sprite_url ? '<img src="' + mon.sprite_url + '" alt="" /><br/>' : '') + mon.name;
        poolEl.appendChild(div);
      }
      runBtn.disabled = false;
      output.textContent = data.contestants.length + ' contestants drawn.';
    });

    runBtn.addEventListener('click', async () => {
      runBtn.disabled = true;
      const response = await fetch('/api/tournament', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ session }),
      });
      const data = await response.json();
      if (!response.ok) { output.textContent = 'HTTP ' + response.status + '\n' + data.message; return; }
      document.getElementById('champion').textContent = 'Champion: ' + data.champion.name;
      const lines = [];
      data.rounds.forEach((round, i) => {
        lines.push('--- Round ' + (i + 1) + ' ---');
        for (const battle of round.battles) {
          const winner = battle.winner === 'first' ? battle.first : battle.second;
          lines.push(battle.first.name + ' vs ' + battle.second.name + ' -> ' + winner.name + (battle.tie_break ? ' (tie)' : ''));
        }
      });
      output.textContent = lines.join('\n');
    });
  </script>
</body>
</html>
"#;
