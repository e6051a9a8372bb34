use anyhow::{Context as _, bail};
use gloo::net::http::{Request, Response};
use pixeldeck_core::Backend;
use pixeldeck_protocol::{GameEntry, GameId, SaveRequest, ScoreRequest, routes};
use serde_json::Value;

/// Joins the API base (e.g. `https://host/`) with an absolute route.
pub(crate) fn endpoint(base: &str, route: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), route)
}

fn check(response: Response) -> anyhow::Result<Response> {
    if !response.ok() {
        bail!(
            "{} answered {} {}",
            response.url(),
            response.status(),
            response.status_text()
        );
    }
    Ok(response)
}

pub(crate) async fn fetch_catalog(base: &str) -> anyhow::Result<Vec<GameEntry>> {
    let url = endpoint(base, &routes::games());
    let response = Request::get(&url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?;
    check(response)?
        .json()
        .await
        .context("decoding the games catalog")
}

/// [`Backend`] talking to the REST API; requests run detached on the browser event loop.
#[derive(Clone, Debug)]
pub(crate) struct HttpBackend {
    base: String,
}

impl HttpBackend {
    pub(crate) fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn post<T: serde::Serialize + 'static>(&self, route: String, body: T, what: &'static str) {
        let url = endpoint(&self.base, &route);
        wasm_bindgen_futures::spawn_local(async move {
            let result = async {
                let response = Request::post(&url).json(&body)?.send().await?;
                check(response)?;
                anyhow::Ok(())
            }
            .await;
            match result {
                Ok(()) => log::debug!("{} sent to {}", what, url),
                Err(err) => log::error!("could not send {} to {}: {:#}", what, url, err),
            }
        });
    }
}

impl Backend for HttpBackend {
    fn submit_score(&self, game_id: GameId, score: u32) {
        self.post(routes::score(game_id), ScoreRequest { score }, "score");
    }

    fn save_game(&self, game_id: GameId, data: Value, preview: Value) {
        self.post(routes::save(game_id), SaveRequest { data, preview }, "save");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_without_double_slashes() {
        assert_eq!(endpoint("", &routes::games()), "/api/games");
        assert_eq!(
            endpoint("https://deck.example/", &routes::score(7)),
            "https://deck.example/api/games/7/score"
        );
        assert_eq!(
            endpoint("http://localhost:8000", &routes::save(2)),
            "http://localhost:8000/api/games/2/save"
        );
    }
}
