//! Tests for the application state machine.
//!
//! Drives [`App`] with scripted events and checks the requested actions,
//! without any network or runtime involved.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use serde_json::json;
    use shared::models::{Customer, LoginResponse, Restaurant};

    use crate::{
        app::{App, AppAction, AppEvent},
        error::ApiError,
        login::{LoginState, Ticket},
        navigation::Screen,
        preferences::MemoryPreferences,
        restaurants::{Notice, SelectionKind},
        session::{KEY_AUTH_TOKEN, KEY_IS_LOGGED_IN, KEY_USER_DATA, SessionStore},
    };

    fn demo_login_response() -> LoginResponse {
        serde_json::from_value(json!({
            "message": "Login successful",
            "sessionToken": "tok-demo",
            "customer": {
                "id": 14,
                "firstName": "Demo",
                "lastName": "User",
                "email": "demo@example.com"
            }
        }))
        .unwrap()
    }

    fn restaurants(count: i64) -> Vec<Restaurant> {
        (1..=count)
            .map(|id| Restaurant {
                id,
                name: format!("Restaurant {id}"),
                ..Restaurant::default()
            })
            .collect()
    }

    fn signed_in_session() -> SessionStore {
        let session = SessionStore::in_memory();
        session
            .persist_with_token(
                &Customer {
                    id: 14,
                    ..Customer::default()
                },
                Some("tok-stored"),
            )
            .unwrap();
        session
    }

    fn login_ticket(actions: &[AppAction]) -> Ticket {
        actions
            .iter()
            .find_map(|action| match action {
                AppAction::Login { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .expect("login action")
    }

    fn fetch_ticket(actions: &[AppAction]) -> Ticket {
        actions
            .iter()
            .find_map(|action| match action {
                AppAction::FetchRestaurants { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .expect("fetch action")
    }

    fn count_logins(actions: &[AppAction]) -> usize {
        actions
            .iter()
            .filter(|action| matches!(action, AppAction::Login { .. }))
            .count()
    }

    #[test]
    fn test_start_logged_out_routes_to_login() {
        let mut app = App::new(SessionStore::in_memory());
        let actions = app.handle(AppEvent::Started);

        assert_eq!(
            actions,
            vec![
                AppAction::Authorize(None),
                AppAction::Navigate(Screen::Login),
                AppAction::Render
            ]
        );
        assert_eq!(app.screen(), Screen::Login);
    }

    #[test]
    fn test_start_logged_in_routes_home_and_fetches() {
        let mut app = App::new(signed_in_session());
        let actions = app.handle(AppEvent::Started);

        assert_eq!(actions[0], AppAction::Authorize(Some("tok-stored".into())));
        assert_eq!(actions[1], AppAction::Navigate(Screen::Restaurants));
        assert!(matches!(actions[2], AppAction::FetchRestaurants { .. }));
        assert!(app.restaurants().is_refreshing());
    }

    #[test]
    fn test_corrupt_session_routes_to_login_and_clears() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.insert_raw(KEY_IS_LOGGED_IN, json!(true));
        prefs.insert_raw(KEY_USER_DATA, json!("{{{"));
        let mut app = App::new(SessionStore::new(prefs.clone()));

        app.handle(AppEvent::Started);
        assert_eq!(app.screen(), Screen::Login);
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_token_of_corrupt_session_is_never_authorized() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.insert_raw(KEY_IS_LOGGED_IN, json!(true));
        prefs.insert_raw(KEY_USER_DATA, json!("{corrupt"));
        prefs.insert_raw(KEY_AUTH_TOKEN, json!("tok-old"));
        let mut app = App::new(SessionStore::new(prefs.clone()));

        let actions = app.handle(AppEvent::Started);
        assert_eq!(
            actions,
            vec![
                AppAction::Authorize(None),
                AppAction::Navigate(Screen::Login),
                AppAction::Render
            ]
        );
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_empty_password_issues_no_request() {
        let mut app = App::new(SessionStore::in_memory());
        app.handle(AppEvent::Started);

        let actions = app.handle(AppEvent::SubmitLogin {
            email: "demo@example.com".into(),
            password: "  ".into(),
        });
        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(
            app.login().status().unwrap().message,
            "Password is required"
        );
    }

    #[test]
    fn test_rapid_double_submit_sends_one_request() {
        let mut app = App::new(SessionStore::in_memory());
        app.handle(AppEvent::Started);

        let submit = || AppEvent::SubmitLogin {
            email: "demo@example.com".into(),
            password: "DemoPassword123!".into(),
        };
        let mut actions = app.handle(submit());
        actions.extend(app.handle(submit()));
        actions.extend(app.handle(AppEvent::TestConnection));

        assert_eq!(count_logins(&actions), 1);
        assert!(!actions
            .iter()
            .any(|action| matches!(action, AppAction::TestConnection { .. })));
    }

    #[test]
    fn test_successful_login_authenticates_and_routes_home() {
        let session = SessionStore::in_memory();
        let mut app = App::new(session.clone());
        app.handle(AppEvent::Started);

        let actions = app.handle(AppEvent::SubmitLogin {
            email: " demo@example.com ".into(),
            password: "DemoPassword123!".into(),
        });
        let ticket = login_ticket(&actions);
        match &actions[0] {
            AppAction::Login { credentials, .. } => {
                assert_eq!(credentials.email(), "demo@example.com");
            }
            other => panic!("unexpected action {other:?}"),
        }

        let actions = app.handle(AppEvent::LoginCompleted {
            ticket,
            result: Ok(demo_login_response()),
        });

        assert!(session.is_authenticated());
        assert_eq!(session.current_user_name(), "Demo User");
        assert_eq!(actions[0], AppAction::Authorize(Some("tok-demo".into())));
        assert_eq!(actions[1], AppAction::Navigate(Screen::Restaurants));
        assert!(matches!(actions[2], AppAction::FetchRestaurants { .. }));
        assert_eq!(app.screen(), Screen::Restaurants);
        assert_eq!(app.login().state(), &LoginState::Success);

        // Login is no longer on the stack; back leaves the app.
        assert_eq!(app.handle(AppEvent::Back), vec![AppAction::Quit]);
        assert!(!app.is_running());
    }

    #[test]
    fn test_rejected_login_can_retry() {
        let mut app = App::new(SessionStore::in_memory());
        app.handle(AppEvent::Started);

        let submit = AppEvent::SubmitLogin {
            email: "demo@example.com".into(),
            password: "wrong".into(),
        };
        let ticket = login_ticket(&app.handle(submit));
        app.handle(AppEvent::LoginCompleted {
            ticket,
            result: Err(ApiError::from_status(
                StatusCode::UNAUTHORIZED,
                r#"{"message":"Invalid email or password"}"#,
            )),
        });

        assert_eq!(app.screen(), Screen::Login);
        assert_eq!(
            app.login().status().unwrap().message,
            "Login failed: Invalid email or password"
        );

        let retry = app.handle(AppEvent::SubmitLogin {
            email: "demo@example.com".into(),
            password: "DemoPassword123!".into(),
        });
        assert_eq!(count_logins(&retry), 1);
    }

    #[test]
    fn test_empty_fetch_and_failure_keep_state_consistent() {
        let mut app = App::new(signed_in_session());
        let ticket = fetch_ticket(&app.handle(AppEvent::Started));

        app.handle(AppEvent::RestaurantsLoaded {
            ticket,
            result: Ok(Vec::new()),
        });
        assert!(app.restaurants().items().is_empty());
        assert!(!app.restaurants().is_refreshing());
        assert_eq!(
            app.restaurants().notice(),
            Some(&Notice::Info("No restaurants found".into()))
        );

        let ticket = fetch_ticket(&app.handle(AppEvent::Refresh));
        app.handle(AppEvent::RestaurantsLoaded {
            ticket,
            result: Ok(restaurants(5)),
        });
        let ticket = fetch_ticket(&app.handle(AppEvent::Refresh));
        app.handle(AppEvent::RestaurantsLoaded {
            ticket,
            result: Err(ApiError::Transport("connection reset".into())),
        });

        assert_eq!(app.restaurants().items().len(), 5);
        assert!(!app.restaurants().is_refreshing());
        assert!(matches!(app.restaurants().notice(), Some(Notice::Error(_))));
    }

    #[test]
    fn test_refresh_is_coalesced() {
        let mut app = App::new(signed_in_session());
        app.handle(AppEvent::Started);
        assert!(app.handle(AppEvent::Refresh).is_empty());
    }

    #[test]
    fn test_late_fetch_after_logout_is_ignored() {
        let session = signed_in_session();
        let mut app = App::new(session.clone());
        let ticket = fetch_ticket(&app.handle(AppEvent::Started));

        let actions = app.handle(AppEvent::Logout);
        assert_eq!(actions[0], AppAction::Logout);
        assert_eq!(actions[1], AppAction::Navigate(Screen::Login));
        assert!(!session.is_authenticated());
        assert_eq!(session.auth_token(), None);

        let late = app.handle(AppEvent::RestaurantsLoaded {
            ticket,
            result: Ok(restaurants(3)),
        });
        assert!(late.is_empty());
        assert!(app.restaurants().items().is_empty());
    }

    #[test]
    fn test_focus_after_external_logout_redirects() {
        let session = signed_in_session();
        let mut app = App::new(session.clone());
        app.handle(AppEvent::Started);
        assert_eq!(app.handle(AppEvent::ScreenFocused), vec![AppAction::Render]);

        session.clear().unwrap();
        let actions = app.handle(AppEvent::ScreenFocused);
        assert_eq!(
            actions,
            vec![
                AppAction::Authorize(None),
                AppAction::Navigate(Screen::Login),
                AppAction::Render
            ]
        );
        assert!(!app.restaurants().is_refreshing());
    }

    #[test]
    fn test_selection_events_are_forwarded() {
        let mut app = App::new(signed_in_session());
        let ticket = fetch_ticket(&app.handle(AppEvent::Started));
        app.handle(AppEvent::RestaurantsLoaded {
            ticket,
            result: Ok(restaurants(2)),
        });

        match app.handle(AppEvent::ViewMenu(1)).as_slice() {
            [AppAction::RestaurantSelected(selection)] => {
                assert_eq!(selection.kind, SelectionKind::Menu);
                assert_eq!(selection.restaurant.id, 2);
            }
            other => panic!("unexpected actions {other:?}"),
        }
        assert!(app.handle(AppEvent::SelectRestaurant(9)).is_empty());
        assert_eq!(app.screen(), Screen::Restaurants);
    }

    #[test]
    fn test_connection_test_round_trip() {
        let mut app = App::new(SessionStore::in_memory());
        app.handle(AppEvent::Started);

        let actions = app.handle(AppEvent::TestConnection);
        let AppAction::TestConnection { ticket } = actions[0] else {
            panic!("expected a connection test, got {actions:?}");
        };
        app.handle(AppEvent::ConnectionTested {
            ticket,
            result: Ok(1),
        });
        assert_eq!(
            app.login().status().unwrap().message,
            "Connected successfully!"
        );
    }

    #[test]
    fn test_quit_stops_processing() {
        let mut app = App::new(SessionStore::in_memory());
        app.handle(AppEvent::Started);

        assert_eq!(app.handle(AppEvent::Quit), vec![AppAction::Quit]);
        assert!(!app.is_running());
        assert!(app.handle(AppEvent::Started).is_empty());
    }
}
