//! Wire-level scenarios against a mock namenode/datanode.

use crate::client::{ClientConfig, DownloadOptions, UploadOptions, WebHdfsClient};
use crate::error::WebHdfsError;
use mockito::{Matcher, Server, ServerGuard};

const NOT_FOUND: &str = r#"{"RemoteException":{"exception":"FileNotFoundException","javaClassName":"java.io.FileNotFoundException","message":"File not found"}}"#;

const FILE_STATUS: &str = r#"{"FileStatus":{"accessTime":0,"blockSize":134217728,"group":"supergroup","length":5,"modificationTime":1320173277227,"owner":"webuser","pathSuffix":"","permission":"644","replication":3,"type":"FILE"}}"#;

fn client_for(server: &ServerGuard) -> WebHdfsClient {
    let config = ClientConfig::from_url(&format!("{}/webhdfs/v1", server.url())).unwrap();
    WebHdfsClient::with_config(config).unwrap()
}

fn op(name: &str) -> Matcher {
    Matcher::UrlEncoded("op".into(), name.into())
}

#[tokio::test]
async fn test_upload_redirect_then_created() {
    let mut server = Server::new_async().await;
    let locate = server
        .mock("PUT", "/webhdfs/v1/tmp/a.txt")
        .match_query(Matcher::AllOf(vec![
            op("CREATE"),
            Matcher::UrlEncoded("user.name".into(), "webuser".into()),
            Matcher::UrlEncoded("overwrite".into(), "true".into()),
        ]))
        .with_status(307)
        .with_header("location", &format!("{}/data/tmp/a.txt", server.url()))
        .create_async()
        .await;
    let data = server
        .mock("PUT", "/data/tmp/a.txt")
        .match_query(Matcher::Any)
        .match_body("hello world")
        .with_status(201)
        .create_async()
        .await;

    let outcome = client_for(&server)
        .write_file("/tmp/a.txt", "hello world")
        .await
        .unwrap();
    assert_eq!(outcome.location, None);

    locate.assert_async().await;
    data.assert_async().await;
}

#[tokio::test]
async fn test_upload_returns_trailing_location() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/webhdfs/v1/f")
        .match_query(op("CREATE"))
        .with_status(307)
        .with_header("location", &format!("{}/data/f", server.url()))
        .create_async()
        .await;
    server
        .mock("PUT", "/data/f")
        .match_query(Matcher::Any)
        .with_status(201)
        .with_header("location", "hdfs://namenode:8020/f")
        .create_async()
        .await;

    let outcome = client_for(&server).write_file("/f", "x").await.unwrap();
    assert_eq!(outcome.location.as_deref(), Some("hdfs://namenode:8020/f"));
}

#[tokio::test]
async fn test_upload_locate_failure_never_contacts_datanode() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/webhdfs/v1/f")
        .match_query(op("CREATE"))
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"RemoteException":{"message":"Permission denied"}}"#)
        .create_async()
        .await;
    let data = server
        .mock("PUT", "/data/f")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client_for(&server).write_file("/f", "x").await.unwrap_err();
    assert_eq!(err.remote_exception().unwrap().message, "Permission denied");
    data.assert_async().await;
}

#[tokio::test]
async fn test_append_posts_to_both_endpoints() {
    let mut server = Server::new_async().await;
    let locate = server
        .mock("POST", "/webhdfs/v1/log")
        .match_query(op("APPEND"))
        .with_status(307)
        .with_header("location", &format!("{}/data/log", server.url()))
        .create_async()
        .await;
    let data = server
        .mock("POST", "/data/log")
        .match_query(Matcher::Any)
        .match_body("line\n")
        .with_status(200)
        .create_async()
        .await;

    client_for(&server).append_file("/log", "line\n").await.unwrap();
    locate.assert_async().await;
    data.assert_async().await;
}

#[tokio::test]
async fn test_write_stream_over_http() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/webhdfs/v1/stream")
        .match_query(op("CREATE"))
        .with_status(307)
        .with_header("location", &format!("{}/data/stream", server.url()))
        .create_async()
        .await;
    let data = server
        .mock("PUT", "/data/stream")
        .match_query(Matcher::Any)
        .match_body("chunk one, chunk two")
        .with_status(201)
        .create_async()
        .await;

    let mut stream = client_for(&server)
        .create_write_stream("/stream", UploadOptions::create())
        .unwrap();
    stream.write("chunk one, ").await.unwrap();
    stream.write("chunk two").await.unwrap();
    stream.finish().await.unwrap();
    data.assert_async().await;
}

#[tokio::test]
async fn test_open_not_found_yields_no_data() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/missing")
        .match_query(op("OPEN"))
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(NOT_FOUND)
        .create_async()
        .await;

    let err = client_for(&server)
        .open("/missing", DownloadOptions::default())
        .await
        .unwrap_err();
    let remote = err.remote_exception().unwrap();
    assert_eq!(remote.message, "File not found");
    assert_eq!(remote.exception.as_deref(), Some("FileNotFoundException"));
}

#[tokio::test]
async fn test_open_follows_redirect() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/f")
        .match_query(op("OPEN"))
        .with_status(307)
        .with_header("location", &format!("{}/data/f", server.url()))
        .create_async()
        .await;
    server
        .mock("GET", "/data/f")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("file contents")
        .create_async()
        .await;

    let bytes = client_for(&server).read_file("/f").await.unwrap();
    assert_eq!(&bytes[..], b"file contents");
}

#[tokio::test]
async fn test_open_passes_range() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/webhdfs/v1/f")
        .match_query(Matcher::AllOf(vec![
            op("OPEN"),
            Matcher::UrlEncoded("offset".into(), "4".into()),
            Matcher::UrlEncoded("length".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let stream = client_for(&server)
        .open("/f", DownloadOptions::range(4, 2))
        .await
        .unwrap();
    assert_eq!(&stream.into_bytes().await.unwrap()[..], b"ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_open_datanode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/f")
        .match_query(op("OPEN"))
        .with_status(307)
        .with_header("location", &format!("{}/data/f", server.url()))
        .create_async()
        .await;
    server
        .mock("GET", "/data/f")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("datanode exploded")
        .create_async()
        .await;

    let err = client_for(&server).read_file("/f").await.unwrap_err();
    assert_eq!(err.remote_exception().unwrap().message, "Unknown error");
}

#[tokio::test]
async fn test_stat_and_exists() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/present")
        .match_query(op("GETFILESTATUS"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FILE_STATUS)
        .create_async()
        .await;
    server
        .mock("GET", "/webhdfs/v1/absent")
        .match_query(op("GETFILESTATUS"))
        .with_status(404)
        .with_body(NOT_FOUND)
        .create_async()
        .await;
    server
        .mock("GET", "/webhdfs/v1/garbled")
        .match_query(op("GETFILESTATUS"))
        .with_status(200)
        .with_body(r#"{"FileStatus":{"length":1}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let status = client.stat("/present").await.unwrap();
    assert!(status.is_file());
    assert_eq!(status.length, 5);

    assert!(client.exists("/present").await);
    assert!(!client.exists("/absent").await);
    assert!(!client.exists("/garbled").await);

    let err = client.stat("/garbled").await.unwrap_err();
    assert!(matches!(err, WebHdfsError::Protocol(msg) if msg.contains("invalid data structure")));
}

#[tokio::test]
async fn test_non_json_success_body_is_protocol_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/f")
        .match_query(op("GETFILESTATUS"))
        .with_status(200)
        .with_body("<html>gateway page</html>")
        .create_async()
        .await;

    let err = client_for(&server).stat("/f").await.unwrap_err();
    assert!(matches!(err, WebHdfsError::Protocol(msg) if msg.contains("invalid data structure")));
}

#[tokio::test]
async fn test_readdir() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/dir")
        .match_query(op("LISTSTATUS"))
        .with_status(200)
        .with_body(
            r#"{"FileStatuses":{"FileStatus":[
                {"accessTime":1,"blockSize":134217728,"group":"g","length":24930,"modificationTime":2,"owner":"o","pathSuffix":"a.patch","permission":"644","replication":1,"type":"FILE"},
                {"accessTime":0,"blockSize":0,"group":"g","length":0,"modificationTime":3,"owner":"o","pathSuffix":"bar","permission":"711","replication":0,"type":"DIRECTORY"}
            ]}}"#,
        )
        .create_async()
        .await;

    let entries = client_for(&server).readdir("/dir").await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.path_suffix.as_str()).collect();
    assert_eq!(names, ["a.patch", "bar"]);
    assert!(entries[1].is_directory());
}

#[tokio::test]
async fn test_mkdir_sends_permission() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/webhdfs/v1/new/dir")
        .match_query(Matcher::AllOf(vec![
            op("MKDIRS"),
            Matcher::UrlEncoded("permission".into(), "0755".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"boolean":true}"#)
        .create_async()
        .await;

    assert!(client_for(&server).mkdir("/new/dir", None).await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rename_and_unlink() {
    let mut server = Server::new_async().await;
    let rename = server
        .mock("PUT", "/webhdfs/v1/a")
        .match_query(Matcher::AllOf(vec![
            op("RENAME"),
            Matcher::UrlEncoded("destination".into(), "/b".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"boolean":true}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/webhdfs/v1/b")
        .match_query(Matcher::AllOf(vec![
            op("DELETE"),
            Matcher::UrlEncoded("recursive".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"boolean":false}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.rename("/a", "/b").await.unwrap());
    assert!(!client.unlink("/b", true).await.unwrap());
    rename.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_concat_sources() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/webhdfs/v1/target")
        .match_query(Matcher::AllOf(vec![
            op("CONCAT"),
            Matcher::UrlEncoded("sources".into(), "/p1,/p2".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&server);
    client.concat("/target", vec!["/p1", "/p2"]).await.unwrap();
    mock.assert_async().await;

    let empty: Vec<String> = Vec::new();
    let err = client.concat("/target", empty).await.unwrap_err();
    assert!(matches!(err, WebHdfsError::Validation(_)));
    let err = client.concat("/target", vec!["/p1", ""]).await.unwrap_err();
    assert!(matches!(err, WebHdfsError::Validation(_)));
}

#[tokio::test]
async fn test_home_directory_and_token() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/")
        .match_query(op("GETHOMEDIRECTORY"))
        .with_status(200)
        .with_body(r#"{"Path":"/user/webuser"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/webhdfs/v1/")
        .match_query(Matcher::AllOf(vec![
            op("GETDELEGATIONTOKEN"),
            Matcher::UrlEncoded("renewer".into(), "yarn".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"Token":{"urlString":"JQAIaG9y"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.home_directory().await.unwrap(), "/user/webuser");
    assert_eq!(
        client.get_delegation_token(Some("yarn")).await.unwrap().url_string,
        "JQAIaG9y"
    );
}

#[tokio::test]
async fn test_metadata_redirect_is_protocol_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/webhdfs/v1/f")
        .match_query(op("GETFILESTATUS"))
        .with_status(307)
        .with_header("location", "http://elsewhere/f")
        .create_async()
        .await;

    let err = client_for(&server).stat("/f").await.unwrap_err();
    assert!(matches!(err, WebHdfsError::Protocol(_)));
}

#[tokio::test]
async fn test_unexpected_status() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/webhdfs/v1/plain")
        .match_query(op("SETPERMISSION"))
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;
    server
        .mock("PUT", "/webhdfs/v1/wrapped")
        .match_query(op("SETPERMISSION"))
        .with_status(503)
        .with_body(r#"{"RemoteException":{"message":"namenode in safe mode"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.chmod("/plain", "755").await.unwrap_err();
    assert!(matches!(err, WebHdfsError::Protocol(msg) if msg.contains("503")));

    let err = client.chmod("/wrapped", "755").await.unwrap_err();
    assert_eq!(err.remote_exception().unwrap().message, "namenode in safe mode");
}

#[tokio::test]
async fn test_invalid_input_fails_before_io() {
    let server = Server::new_async().await;
    let client = client_for(&server);

    assert!(matches!(
        client.chmod("/f", "999").await.unwrap_err(),
        WebHdfsError::Validation(_)
    ));
    assert!(matches!(client.stat("  ").await.unwrap_err(), WebHdfsError::Validation(_)));
    assert!(matches!(
        client.set_times("/f", None, None).await.unwrap_err(),
        WebHdfsError::Validation(_)
    ));
}
