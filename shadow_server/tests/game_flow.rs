mod support;

use serde_json::{Value, json};
use support::{Client, connect, recv_type, send};

async fn create_room(host: &mut Client, name: &str) -> String {
    send(host, json!({"type": "createRoom", "data": {"playerName": name}})).await;
    let created = recv_type(host, "roomCreated").await;
    created["data"]["roomCode"]
        .as_str()
        .expect("room code")
        .to_string()
}

async fn join(client: &mut Client, code: &str, name: &str) -> Value {
    send(
        client,
        json!({"type": "joinRoom", "data": {"roomCode": code, "playerName": name}}),
    )
    .await;
    recv_type(client, "joinSuccess").await
}

async fn wait_for_turn(client: &mut Client, player_id: &str) {
    loop {
        let turn = recv_type(client, "turnChange").await;
        if turn["data"]["activePlayerId"] == player_id {
            return;
        }
    }
}

#[tokio::test]
async fn when_room_is_created_then_code_is_six_uppercase_characters() {
    let (mut host, host_id) = connect().await;

    send(&mut host, json!({"type": "createRoom", "data": {"playerName": "Alice"}})).await;
    let created = recv_type(&mut host, "roomCreated").await;

    let code = created["data"]["roomCode"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(created["data"]["players"][0]["id"], host_id.as_str());
    assert_eq!(created["data"]["players"][0]["isHost"], true);
}

#[tokio::test]
async fn when_name_is_taken_then_joiner_gets_an_error() {
    let (mut host, _) = connect().await;
    let code = create_room(&mut host, "Alice").await;
    let (mut guest, _) = connect().await;

    send(
        &mut guest,
        json!({"type": "joinRoom", "data": {"roomCode": code, "playerName": "alice"}}),
    )
    .await;
    let error = recv_type(&mut guest, "error").await;

    assert_eq!(error["data"]["message"], "Name taken");
}

#[tokio::test]
async fn when_room_does_not_exist_then_joiner_gets_an_error() {
    let (mut guest, _) = connect().await;

    send(
        &mut guest,
        json!({"type": "joinRoom", "data": {"roomCode": "NOPE00", "playerName": "Bob"}}),
    )
    .await;
    let error = recv_type(&mut guest, "error").await;

    assert_eq!(error["data"]["message"], "Room not found");
}

#[tokio::test]
async fn when_host_starts_with_two_players_then_start_is_refused() {
    let (mut host, _) = connect().await;
    let code = create_room(&mut host, "Alice").await;
    let (mut guest, _) = connect().await;
    join(&mut guest, &code, "Bob").await;

    send(&mut host, json!({"type": "startGame"})).await;
    let error = recv_type(&mut host, "error").await;

    assert_eq!(error["data"]["message"], "Min 3 players required");
}

#[tokio::test]
async fn when_three_players_finish_a_round_then_votes_decide_the_game() {
    let (mut alice, alice_id) = connect().await;
    let code = create_room(&mut alice, "Alice").await;
    let (mut bob, bob_id) = connect().await;
    let (mut cara, cara_id) = connect().await;
    join(&mut bob, &code, "Bob").await;
    let joined = join(&mut cara, &code, "Cara").await;
    assert_eq!(joined["data"]["players"].as_array().unwrap().len(), 3);

    send(&mut alice, json!({"type": "startGame"})).await;

    let mut clients = [(alice, alice_id), (bob, bob_id), (cara, cara_id)];
    let mut shadow_id = None;
    let mut words = Vec::new();
    for (client, id) in clients.iter_mut() {
        let started = recv_type(client, "gameStarted").await;
        match started["data"]["role"].as_str().unwrap() {
            "INFILTRATOR" => {
                assert!(started["data"]["word"].is_null());
                shadow_id = Some(id.clone());
            }
            role => {
                assert_eq!(role, "CITIZEN");
                words.push(started["data"]["word"].clone());
            }
        }
    }
    let shadow_id = shadow_id.expect("exactly one shadow");
    assert_eq!(words.len(), 2);
    assert_eq!(words[0], words[1]);

    // Turn order follows join order.
    for (index, clue) in ["red", "round", "sweet"].into_iter().enumerate() {
        let (client, id) = &mut clients[index];
        wait_for_turn(client, id).await;
        send(client, json!({"type": "submitClue", "data": {"clue": clue}})).await;
    }
    let phase = recv_type(&mut clients[0].0, "phaseChange").await;
    assert_eq!(phase["data"]["status"], "VOTING");
    assert_eq!(phase["data"]["players"][2]["clue"], "sweet");

    let majority: Vec<String> = clients
        .iter()
        .map(|(_, id)| id.clone())
        .filter(|id| *id != shadow_id)
        .collect();
    for (client, id) in clients.iter_mut() {
        let target = if *id == shadow_id {
            majority[0].clone()
        } else {
            shadow_id.clone()
        };
        send(client, json!({"type": "castVote", "data": {"targetId": target}})).await;
    }

    let over = recv_type(&mut clients[0].0, "gameOver").await;
    assert_eq!(over["data"]["winner"], "CITIZENS");
    assert_eq!(over["data"]["roleWas"], "INFILTRATOR");
    let revealed = over["data"]["players"].as_array().unwrap();
    assert!(revealed.iter().all(|p| p["role"] != "PENDING"));
}
