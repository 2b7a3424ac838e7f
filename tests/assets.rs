//! Glove asset endpoints against the mock node.

use alloy::primitives::Address;

use handroyal_client::assets::{AssetClient, AssetError, Hand};

mod common;

#[tokio::test]
async fn test_register_glove_uploads_multipart() {
    let (node, addr) = common::start_mock_node().await;
    let client = AssetClient::new(&common::config_for(addr).assets).unwrap();
    let glove = Address::repeat_byte(0xab);

    let body = client
        .register_glove(glove, "glove.png", vec![0x89, b'P', b'N', b'G'])
        .await
        .unwrap();
    assert_eq!(body, "registered");

    let uploads = node.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].address.as_deref(), Some(glove.to_string().as_str()));
    assert_eq!(uploads[0].file_name.as_deref(), Some("glove.png"));
    assert_eq!(uploads[0].bytes, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_register_glove_rejected() {
    let (_node, addr) = common::start_mock_node().await;
    let client = AssetClient::new(&common::config_for(addr).assets).unwrap();

    let err = client
        .register_glove(Address::ZERO, "empty.png", Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AssetError::Status { status: 400, .. }));
}

#[tokio::test]
async fn test_glove_image_query() {
    let (node, addr) = common::start_mock_node().await;
    let client = AssetClient::new(&common::config_for(addr).assets).unwrap();
    let glove = Address::repeat_byte(0x0c);

    let image = client.glove_image(glove, Hand::Left).await.unwrap();
    assert_eq!(image, format!("image:{}:left", glove.to_string().to_lowercase()).into_bytes());

    let queries = node.image_queries();
    assert_eq!(queries[0]["hand"], "left");
    assert_eq!(queries[0]["gloveAddress"], glove.to_string());
}
