//! # Google Sheets End-to-End Scenario
//!
//! Drives a host through adding the Google Sheets data source, a dashboard
//! and a panel. The browser side is abstracted as [`HostUi`], the HTTP side
//! as [`HostApi`] ([`HttpHostApi`] for a real host).
//!
//! State created by one step (data source name and id, dashboard title and
//! uid) is kept in a [`ScenarioContext`] that the steps share explicitly.
//!
//! ```rust,no_run
//! # use sheets_e2e::{HostUi, HttpHostApi, from_base_url, smoke_scenario};
//! # async fn run(ui: impl HostUi) -> sheets_e2e::Result<()> {
//! let base = from_base_url("", None)?;
//! let context = smoke_scenario(ui, HttpHostApi::new(), base.as_str()).await?;
//! println!("added {:?}", context.last_added_data_source);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod flows;
pub mod host;
pub mod host_url;

pub use context::{CONTEXT_KEYS, ScenarioContext};
pub use error::{E2eError, Result};
pub use flows::{DataSourceConfig, FieldInput, PanelConfig, Scenario, smoke_scenario};
pub use host::{HostApi, HostUi, HttpHostApi};
pub use host_url::{dashboard_uid, data_source_id, from_base_url};
