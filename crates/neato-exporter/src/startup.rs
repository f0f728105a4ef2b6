//! Startup checks.
//!
//! Every failure here is fatal: the exporter either starts with a valid
//! robot list, registered gauges and a bound listener, or not at all.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use neato_core::{RobotApi, Selection, SelectionError};
use neato_types::Robot;

use crate::config::ConfigError;
use crate::metrics::MetricsError;

/// Fatal startup errors.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to parse bot indexes: {0}")]
    Selection(#[from] SelectionError),
    #[error("Failed to get robots: {0}")]
    Roster(#[source] neato_core::Error),
    #[error("No bots found")]
    NoRobots,
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Fetch the roster and pick the robots to poll.
///
/// Robots are returned in roster order for [`Selection::All`] and in
/// ascending index order otherwise.
pub async fn select_robots(
    api: &dyn RobotApi,
    selection: &Selection,
) -> Result<Vec<Robot>, StartupError> {
    let roster = api.robots().await.map_err(StartupError::Roster)?;
    if roster.is_empty() {
        return Err(StartupError::NoRobots);
    }

    let robots = selection.resolve(&roster)?;
    info!(
        "Selected {} of {} robot(s) ({})",
        robots.len(),
        roster.len(),
        selection
    );
    for robot in &robots {
        info!(
            "  {} (serial: {}, model: {})",
            robot.name,
            robot.serial,
            robot.model_label()
        );
    }
    Ok(robots)
}

/// Bind the scrape listener.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, StartupError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use neato_core::MockApi;
    use neato_types::RobotState;

    fn roster_of(n: usize) -> MockApi {
        (1..=n).fold(MockApi::new(), |api, i| {
            api.with_robot(
                Robot::new(format!("Robot {i}"), format!("SN{i}")),
                RobotState::default(),
            )
        })
    }

    fn serials(robots: &[Robot]) -> Vec<&str> {
        robots.iter().map(|r| r.serial.as_str()).collect()
    }

    #[tokio::test]
    async fn test_select_all() {
        let api = roster_of(3);
        let robots = select_robots(&api, &Selection::All).await.unwrap();
        assert_eq!(serials(&robots), ["SN1", "SN2", "SN3"]);
    }

    #[tokio::test]
    async fn test_select_subset() {
        let api = roster_of(3);
        let selection = Selection::parse("3,1").unwrap();
        let robots = select_robots(&api, &selection).await.unwrap();
        assert_eq!(serials(&robots), ["SN1", "SN3"]);
    }

    #[tokio::test]
    async fn test_out_of_bounds_is_fatal() {
        let api = roster_of(3);
        let selection = Selection::parse("1,5").unwrap();
        let err = select_robots(&api, &selection).await.unwrap_err();
        assert!(matches!(
            err,
            StartupError::Selection(SelectionError::OutOfBounds { index: 5, total: 3 })
        ));
        assert!(err.to_string().contains("there are 3 robots in total"));
    }

    #[tokio::test]
    async fn test_empty_roster_is_fatal() {
        let api = MockApi::new();
        let err = select_robots(&api, &Selection::All).await.unwrap_err();
        assert!(matches!(err, StartupError::NoRobots));
    }

    #[tokio::test]
    async fn test_roster_failure_is_fatal() {
        let api = roster_of(2);
        api.set_roster_fails(true);
        let err = select_robots(&api, &Selection::All).await.unwrap_err();
        assert!(matches!(err, StartupError::Roster(_)));
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let first = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = first.local_addr().unwrap();

        let err = bind(addr).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
        assert!(err.to_string().contains(&addr.to_string()));
    }
}
