//! Two sessions walking through connect, character choice, play, logoff and
//! leave on a local network.

use cmdlink_client::{Session, SessionConfig, SessionError, SessionSignal, TopState};
use cmdlink_shared::{Command, LocalNetwork};
use cmdlink_test::{assert_queue_empty, assert_session_state, SessionPair};

fn connected_pair() -> SessionPair {
    let mut pair = SessionPair::new();
    assert!(
        pair.tick_until(20, |pair| pair.both_in(TopState::ChooseCharacter)),
        "peers never connected: host {:?}, guest {:?}",
        pair.host.state(),
        pair.guest.state()
    );
    pair
}

fn playing_pair() -> SessionPair {
    let mut pair = connected_pair();
    pair.guest.select_character("Ayla");
    assert!(pair.tick_until(20, |pair| pair.guest.phase_state() == Some("Playing")));
    pair
}

#[test]
fn peers_connect_and_learn_each_other() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let pair = connected_pair();

    assert_eq!(pair.host.context().peer(), Some(SessionPair::GUEST));
    assert_eq!(pair.guest.context().peer(), Some(SessionPair::HOST));
    assert_eq!(pair.host.context().peer_player_id(), Some(200));
    assert_eq!(pair.guest.context().peer_player_id(), Some(100));
    assert_eq!(pair.guest.phase_state(), Some("Choosing"));
}

#[test]
fn choosing_a_character_joins_the_hosted_game() {
    let mut pair = playing_pair();

    assert_session_state!(pair.guest, TopState::PlayGame);
    assert_eq!(pair.guest.context().character(), Some("Ayla"));
    assert_eq!(pair.guest.context().game_seed(), Some(0x5EED));
    // the host answers join requests without leaving character selection
    assert_session_state!(pair.host, TopState::ChooseCharacter);

    assert!(pair.tick_until(30, |pair| pair.host.context().peer_tick().is_some()));
}

#[test]
fn playing_emits_sync_every_interval() {
    let mut pair = playing_pair();
    let sent_before = pair.guest.stats().packets_sent;
    let acks_before = pair.host.stats().acks_sent;

    for _ in 0..70 {
        pair.tick();
    }

    // ten SYNCs at the default interval of 7, none of them acknowledged
    let sent = pair.guest.stats().packets_sent - sent_before;
    assert!(sent >= 10, "only {} packets sent while playing", sent);
    assert!(pair.guest.context().queue().pending(Command::Sync) <= 1);
    assert_eq!(pair.host.stats().acks_sent, acks_before);
}

#[test]
fn logoff_saves_and_returns_to_character_selection() {
    let mut pair = playing_pair();
    pair.guest.logoff();

    assert!(pair.tick_until(5, |pair| pair.guest.state() == Some(TopState::LogoffCharacter)));
    assert!(pair.tick_until(20, |pair| pair.guest.state() == Some(TopState::ChooseCharacter)));

    assert_eq!(pair.guest.context().character(), None);
    let texts: Vec<&str> = pair
        .host
        .context()
        .received()
        .iter()
        .map(|received| received.text.as_str())
        .collect();
    assert!(texts.contains(&"logoff"));
}

#[test]
fn logoff_can_be_aborted_before_the_save_lands() {
    let mut pair = playing_pair();
    pair.network.set_send_failure(&SessionPair::HOST, true);
    pair.guest.logoff();

    assert!(pair.tick_until(5, |pair| pair.guest.state() == Some(TopState::LogoffCharacter)));
    pair.guest.abort_logoff();
    assert!(pair.tick_until(5, |pair| pair.guest.state() == Some(TopState::PlayGame)));

    pair.network.set_send_failure(&SessionPair::HOST, false);
    assert!(pair.tick_until(300, |pair| pair.guest.phase_state() == Some("Playing")));
    assert_eq!(pair.guest.context().character(), Some("Ayla"));
}

#[test]
fn logoff_times_out_when_the_peer_never_acks() {
    let host_config = SessionConfig {
        player_id: 100,
        ..SessionConfig::default()
    };
    let guest_config = SessionConfig {
        player_id: 200,
        logoff_timeout: 30,
        ..SessionConfig::default()
    };
    let mut pair = SessionPair::with_configs(host_config, guest_config);
    assert!(pair.tick_until(20, |pair| pair.both_in(TopState::ChooseCharacter)));
    pair.guest.select_character("Ayla");
    assert!(pair.tick_until(20, |pair| pair.guest.phase_state() == Some("Playing")));

    pair.network.set_send_failure(&SessionPair::HOST, true);
    pair.guest.logoff();
    assert!(pair.tick_until(5, |pair| pair.guest.state() == Some(TopState::LogoffCharacter)));

    let entered = pair.now;
    assert!(pair.tick_until(40, |pair| pair.guest.state() == Some(TopState::ChooseCharacter)));
    assert!(pair.now - entered >= 30);
}

#[test]
fn leaving_notifies_the_peer_and_disconnects() {
    let mut pair = connected_pair();
    pair.guest.leave();

    assert!(pair.tick_until(5, |pair| pair.guest.state() == Some(TopState::LeaveServer)));
    assert!(pair.tick_until(20, |pair| pair.guest.state() == Some(TopState::Disconnected)));
    assert_eq!(pair.guest.phase_state(), None);

    let notice = pair
        .host
        .context()
        .received()
        .iter()
        .find(|received| received.command == Command::TownUiMessage)
        .map(|received| received.text.clone());
    assert_eq!(notice.as_deref(), Some("leave"));

    pair.guest.exit();
    assert!(pair.tick_until(5, |pair| pair.guest.is_finished()));
}

#[test]
fn connection_loss_disconnects_from_any_phase() {
    let mut pair = playing_pair();
    pair.guest.connection_lost();

    assert!(pair.tick_until(5, |pair| pair.guest.state() == Some(TopState::Disconnected)));
    assert_eq!(pair.guest.phase_state(), None);

    // the host only announces while connecting, so both ends start over
    pair.host.connection_lost();
    assert!(pair.tick_until(5, |pair| pair.host.state() == Some(TopState::Disconnected)));

    pair.host.reconnect();
    pair.guest.reconnect();
    assert!(pair.tick_until(5, |pair| pair.both_in(TopState::Connect)));
    assert!(pair.tick_until(20, |pair| pair.both_in(TopState::ChooseCharacter)));
}

#[test]
fn connect_times_out_without_a_peer() {
    let network = LocalNetwork::new();
    let config = SessionConfig {
        connect_timeout: 20,
        connect_announce_interval: 5,
        ..SessionConfig::default()
    };
    let mut session = Session::new(Box::new(network.join(SessionPair::HOST)), config).unwrap();
    session.start(0).unwrap();
    assert_session_state!(session, TopState::Connect);
    assert_eq!(session.phase_state(), Some("Announcing"));

    let mut now = 0;
    while session.state() == Some(TopState::Connect) && now < 50 {
        now += 1;
        session.tick(now);
    }

    assert_session_state!(session, TopState::Disconnected);
    assert!(now >= 20);
    // one announce on entry, then one every five ticks until the timeout
    assert!(session.stats().packets_sent >= 4);
}

#[test]
fn start_twice_is_rejected() {
    let network = LocalNetwork::new();
    let mut session =
        Session::new(Box::new(network.join(SessionPair::HOST)), SessionConfig::default()).unwrap();

    assert_eq!(session.state(), None);
    session.start(0).unwrap();
    assert_eq!(
        session.start(1),
        Err(SessionError::AlreadyStarted { state: "Connect" })
    );
}

#[test]
fn chat_is_echoed_locally_and_delivered() {
    let mut pair = SessionPair::new();
    assert_eq!(pair.guest.try_say("too early"), Err(SessionError::NoPeer));

    assert!(pair.tick_until(20, |pair| pair.both_in(TopState::ChooseCharacter)));
    pair.guest.try_say("hello").unwrap();
    assert!(pair.tick_until(5, |pair| {
        !pair.host.context().received().is_empty() && !pair.guest.context().received().is_empty()
    }));

    let own = &pair.guest.context().received()[0];
    assert_eq!(own.text, "hello");
    assert_eq!(own.from, SessionPair::GUEST);
    let delivered = &pair.host.context().received()[0];
    assert_eq!(delivered.text, "hello");
}

#[test]
fn application_signals_are_ignored_by_unrelated_phases() {
    let mut pair = connected_pair();
    pair.guest.signal(SessionSignal::AbortLogoff);
    pair.guest.logoff();

    for _ in 0..5 {
        pair.tick();
    }
    assert_session_state!(pair.guest, TopState::ChooseCharacter);
}

#[test]
fn shutdown_exits_the_phase_and_clears_the_port() {
    let mut pair = playing_pair();
    pair.guest.logoff();
    pair.network.set_send_failure(&SessionPair::GUEST, true);
    assert!(pair.tick_until(5, |pair| pair.guest.state() == Some(TopState::LogoffCharacter)));
    pair.tick();
    assert!(pair.guest.context().queue().total_pending() > 0);

    let SessionPair { guest, network, .. } = pair;
    let ctx = guest.shutdown();

    assert_queue_empty!(ctx.queue());
    assert_eq!(network.inbox_len(&SessionPair::GUEST), 0);
}

#[test]
fn received_log_keeps_only_the_newest_lines() {
    let host_config = SessionConfig {
        player_id: 100,
        ..SessionConfig::default()
    };
    let guest_config = SessionConfig {
        player_id: 200,
        received_capacity: 2,
        ..SessionConfig::default()
    };
    let mut pair = SessionPair::with_configs(host_config, guest_config);
    assert!(pair.tick_until(20, |pair| pair.both_in(TopState::ChooseCharacter)));

    for text in ["one", "two", "three"] {
        pair.guest.try_say(text).unwrap();
    }
    assert!(pair.tick_until(5, |pair| pair.host.context().received().len() == 3));

    let kept: Vec<_> = pair
        .guest
        .context()
        .received()
        .iter()
        .map(|received| received.text.as_str())
        .collect();
    assert_eq!(kept, vec!["two", "three"]);

    let taken = pair.guest.take_received();
    assert_eq!(taken.len(), 2);
    assert!(pair.guest.context().received().is_empty());
}

#[test]
fn ticking_before_start_does_not_pile_up_signals() {
    let network = LocalNetwork::new();
    let mut host =
        Session::new(Box::new(network.join(SessionPair::HOST)), SessionConfig::default()).unwrap();
    let mut guest = Session::new(
        Box::new(network.join(SessionPair::GUEST)),
        SessionConfig {
            player_id: 200,
            ..SessionConfig::default()
        },
    )
    .unwrap();
    host.start(0).unwrap();

    for now in 1..=150 {
        host.tick(now);
        guest.tick(now);
        assert_eq!(guest.pending_signals(), 0);
    }
    // the host's announcements did reach the idle guest
    assert!(guest.stats().dispatched > 0);
    assert_eq!(guest.state(), None);

    // once started, the guest announces itself and the host connects
    guest.start(150).unwrap();
    let mut now = 150;
    while now < 160 && host.state() != Some(TopState::ChooseCharacter) {
        now += 1;
        host.tick(now);
        guest.tick(now);
    }
    assert_session_state!(host, TopState::ChooseCharacter);
    assert_session_state!(guest, TopState::Connect);
}
