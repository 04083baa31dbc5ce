use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use sqlitedis::connection::Connection;
use sqlitedis::frame::Frame;

/// Connects a client to a one-shot peer task that writes `chunks` to the
/// socket in order and then closes it.
async fn connection_fed_with(chunks: Vec<Vec<u8>>) -> Connection {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            for chunk in chunks {
                if socket.write_all(&chunk).await.is_err() {
                    break;
                }
            }
        }
    });

    let stream = TcpStream::connect(local_addr).await.unwrap();
    Connection::new(stream)
}

#[tokio::test]
async fn reads_a_pipelined_command_stream() {
    // Three commands in a single write, the way a pipelining client sends
    // them; each read_frame call must pop exactly one off the buffer.
    let mut connection = connection_fed_with(vec![
        b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n\
          *2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n\
          *1\r\n$8\r\nFLUSHALL\r\n"
            .to_vec(),
    ])
    .await;

    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("bar")),
        ]))
    );
    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("foo")),
        ]))
    );
    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Array(vec![Frame::Bulk(Bytes::from("FLUSHALL"))]))
    );
    assert_eq!(connection.read_frame().await.unwrap(), None);
}

#[tokio::test]
async fn reads_a_frame_split_across_writes() {
    let mut connection = connection_fed_with(vec![
        b"*2\r\n$4\r\nLPOP\r\n$3\r\nf".to_vec(),
        b"oo\r\n".to_vec(),
    ])
    .await;

    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Array(vec![
            Frame::Bulk(Bytes::from("LPOP")),
            Frame::Bulk(Bytes::from("foo")),
        ]))
    );
}

#[tokio::test]
async fn reads_the_reply_side_of_a_transaction() {
    // What a client sees during MULTI/EXEC: OK, two QUEUED, then the EXEC
    // array carrying a per-slot WRONGTYPE error, an integer, and a nil.
    let mut connection = connection_fed_with(vec![
        b"+OK\r\n\
          +QUEUED\r\n\
          +QUEUED\r\n\
          *3\r\n\
          -WRONGTYPE Operation against a key holding the wrong kind of value\r\n\
          :1\r\n\
          $-1\r\n"
            .to_vec(),
    ])
    .await;

    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Simple("OK".to_string()))
    );
    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Simple("QUEUED".to_string()))
    );
    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Simple("QUEUED".to_string()))
    );
    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Array(vec![
            Frame::Error(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string()
            ),
            Frame::Integer(1),
            Frame::NullBulkString,
        ]))
    );
}

#[tokio::test]
async fn bulk_payloads_survive_byte_exact() {
    // Bulk strings are length-delimited; embedded CRLF and NUL bytes must
    // not split the frame.
    let mut connection =
        connection_fed_with(vec![b"*3\r\n$4\r\nHSET\r\n$3\r\njob\r\n$10\r\nid\r\n1\x00done\r\n".to_vec()])
            .await;

    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Array(vec![
            Frame::Bulk(Bytes::from("HSET")),
            Frame::Bulk(Bytes::from("job")),
            Frame::Bulk(Bytes::from(&b"id\r\n1\x00done"[..])),
        ]))
    );
}

#[tokio::test]
async fn clean_disconnect_returns_none() {
    let mut connection = connection_fed_with(vec![]).await;

    assert_eq!(connection.read_frame().await.unwrap(), None);
}
