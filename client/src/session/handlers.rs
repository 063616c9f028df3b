use log::{debug, warn};

use cmdlink_shared::{
    CmdQueue, Command, CommandCallbacks, CommandPayload, Destination, GameRequestJoin,
    GameRespondJoin, GameStart, Packet, PlayerIdSelf, SyncPayload, TextMessage, TownUiMessage,
};

use crate::session::{
    session_config::SessionConfig,
    signals::{SessionSignal, SignalQueue},
};

fn decode<P: CommandPayload>(packet: &Packet) -> Option<P> {
    match packet.payload::<P>() {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!("ignoring {:?} from {}: {}", P::COMMAND, packet.sender(), err);
            None
        }
    }
}

/// Handler table that turns inbound commands into session signals, and
/// answers join requests from peers.
pub(crate) fn session_callbacks(signals: &SignalQueue, config: &SessionConfig) -> CommandCallbacks {
    let accept_joins = config.accept_joins;
    let hosted_game = config.game_id;
    let game_seed = config.game_seed;

    let on_player_id = signals.clone();
    let on_respond = signals.clone();
    let on_start = signals.clone();
    let on_sync = signals.clone();
    let on_message = signals.clone();
    let on_town_ui = signals.clone();

    CommandCallbacks::new()
        .on(Command::PlayerIdSelf, move |_: &mut CmdQueue, packet: &Packet| {
            if let Some(announce) = decode::<PlayerIdSelf>(packet) {
                on_player_id.push(SessionSignal::PeerSeen {
                    address: packet.sender(),
                    player_id: announce.player_id,
                });
            }
        })
        .on(Command::GameRequestJoin, move |queue: &mut CmdQueue, packet: &Packet| {
            let Some(request) = decode::<GameRequestJoin>(packet) else {
                return;
            };
            let accepted = accept_joins && request.game_id == hosted_game;
            debug!(
                "join request for game {} from {}: {}",
                request.game_id,
                packet.sender(),
                if accepted { "accepted" } else { "rejected" }
            );

            let peer = Destination::Unicast(packet.sender());
            queue.send(
                Packet::from_payload(&GameRespondJoin {
                    game_id: request.game_id,
                    accepted,
                }),
                peer,
            );
            if accepted {
                queue.send(
                    Packet::from_payload(&GameStart {
                        game_id: request.game_id,
                        seed: game_seed,
                    }),
                    peer,
                );
            }
        })
        .on(Command::GameRespondJoin, move |_: &mut CmdQueue, packet: &Packet| {
            if let Some(response) = decode::<GameRespondJoin>(packet) {
                on_respond.push(if response.accepted {
                    SessionSignal::JoinAccepted {
                        game_id: response.game_id,
                    }
                } else {
                    SessionSignal::JoinRejected {
                        game_id: response.game_id,
                    }
                });
            }
        })
        .on(Command::GameStart, move |_: &mut CmdQueue, packet: &Packet| {
            if let Some(start) = decode::<GameStart>(packet) {
                on_start.push(SessionSignal::Started {
                    game_id: start.game_id,
                    seed: start.seed,
                });
            }
        })
        .on(Command::Sync, move |_: &mut CmdQueue, packet: &Packet| {
            if let Some(sync) = decode::<SyncPayload>(packet) {
                on_sync.push(SessionSignal::SyncReceived {
                    from: packet.sender(),
                    tick: sync.tick,
                    sequence: sync.sequence,
                });
            }
        })
        .on(Command::Message, move |_: &mut CmdQueue, packet: &Packet| {
            if let Some(message) = decode::<TextMessage>(packet) {
                on_message.push(SessionSignal::Text {
                    from: packet.sender(),
                    command: Command::Message,
                    text: message.text,
                });
            }
        })
        .on(Command::TownUiMessage, move |_: &mut CmdQueue, packet: &Packet| {
            if let Some(message) = decode::<TownUiMessage>(packet) {
                on_town_ui.push(SessionSignal::Text {
                    from: packet.sender(),
                    command: Command::TownUiMessage,
                    text: message.text,
                });
            }
        })
}
