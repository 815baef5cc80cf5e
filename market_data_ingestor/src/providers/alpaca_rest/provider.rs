use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::{debug, instrument};

use crate::{
    models::{bar::RawBar, profile::CompanyProfile, request_params::BarsRequest},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ProviderSettings,
        alpaca_rest::{
            params::{AlpacaBarsParams, construct_params},
            response::AlpacaResponse,
        },
    },
};

pub const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    url: String,
    params: AlpacaBarsParams,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?.into());
        let secret_key =
            SecretString::new(get_env_var("APCA_API_SECRET_KEY").context(MissingEnvVarSnafu)?.into());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            url: settings.alpaca_url.clone(),
            params: AlpacaBarsParams::default(),
            limiter: RateLimiter::direct(Quota::per_second(settings.requests_per_second)),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    /// Override the feed, adjustment or page size.
    pub fn with_params(mut self, params: AlpacaBarsParams) -> Self {
        self.params = params;
        self
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    #[instrument(name = "alpaca_bars", skip(self), fields(symbol = %request.symbol))]
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
        let mut bars: Vec<RawBar> = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut query_params = construct_params(request, &self.params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            self.limiter.until_ready().await;
            let response = self.client.get(&self.url).query(&query_params).send().await?;

            if !response.status().is_success() {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu { message: error_msg }.fail();
            }

            let page = response.json::<AlpacaResponse>().await?;

            // Only the requested symbol is ever present.
            if let Some(mut by_symbol) = page.bars {
                if let Some(page_bars) = by_symbol.swap_remove(&request.symbol) {
                    bars.extend(page_bars.into_iter().map(RawBar::from));
                }
            }

            match page.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        debug!(rows = bars.len(), "fetched bars");
        Ok(bars)
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        debug!(symbol, "alpaca has no fundamentals endpoint");
        Ok(CompanyProfile::unavailable(symbol))
    }
}
