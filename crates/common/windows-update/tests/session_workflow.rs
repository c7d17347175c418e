//! End-to-end session flows against in-memory agent objects: configure a
//! session, search, read history, then download and install the results.

mod util;

use std::cell::RefCell;
use std::rc::Rc;

use serial_test::serial;
use util::*;
use windows_update::memory::{CallKind, CallLog, MemoryCollection, MemoryFactory, MemoryObject};
use windows_update::{
    DownloadPriority, ObjectFactory, ObjectRef, OperationResultCode, SearcherConfig,
    ServerSelection, SessionConfig, UpdateAgentError, UpdateSession, Value, prog_id,
};

struct Agent {
    session: ObjectRef,
    searcher: CallLog,
    downloader: CallLog,
    installer: CallLog,
    /// Every collection the session created, in order.
    outbound: Rc<RefCell<Vec<MemoryCollection>>>,
}

impl Agent {
    fn new() -> Self {
        Self::with_installer(installer())
    }

    fn with_installer(installer: MemoryObject) -> Self {
        let updates = vec![
            update("0a4b5c6d", "2024-01 Cumulative Update for Windows 11").into_ref(),
            update("1f2e3d4c", "Security Intelligence Update for Microsoft Defender").into_ref(),
        ];
        let history = vec![
            history_entry("2024-01 Cumulative Update for Windows 11", 2),
            history_entry("Windows Malicious Software Removal Tool", 4),
            history_entry("Servicing Stack Update", 2),
        ];
        let searcher = searcher(search_result(updates), history);
        let downloader = downloader();
        let logs = (searcher.log(), downloader.log(), installer.log());
        let session = session(
            searcher.into_ref(),
            downloader.into_ref(),
            installer.into_ref(),
            service_manager(vec![]).into_ref(),
        );
        Self {
            session: session.into_ref(),
            searcher: logs.0,
            downloader: logs.1,
            installer: logs.2,
            outbound: Rc::default(),
        }
    }

    fn factory(&self) -> Rc<dyn ObjectFactory> {
        let outbound = Rc::clone(&self.outbound);
        Rc::new(
            MemoryFactory::new()
                .register_object(prog_id::UPDATE_SESSION, self.session.clone())
                .register(prog_id::UPDATE_COLLECTION, move || {
                    let coll = MemoryCollection::new();
                    outbound.borrow_mut().push(coll.clone());
                    Ok(coll.to_ref())
                }),
        )
    }
}

#[test]
#[serial]
fn default_session_leaves_agent_settings_untouched() {
    init_tracing();
    let agent = Agent::new();
    let session = UpdateSession::new(agent.factory()).unwrap();
    assert_eq!(session.client_application_id(), "");
    assert!(!session.read_only());
    assert!(session.web_proxy().unwrap().is_none());

    let searcher = session.create_update_searcher().unwrap();
    assert!(searcher.online());
    assert!(
        agent
            .searcher
            .calls()
            .iter()
            .all(|call| call.kind == CallKind::Get)
    );
}

#[test]
#[serial]
fn web_proxy_is_read_and_written_back() {
    init_tracing();
    let proxy = MemoryObject::new("WebProxy")
        .with_property("Address", "proxy.corp.example:8080")
        .with_property("BypassList", strings(&["<local>"]))
        .with_property("BypassProxyOnLocal", true)
        .missing_as_null()
        .into_ref();
    let remote = session(
        searcher(search_result(vec![]), vec![]).into_ref(),
        downloader().into_ref(),
        installer().into_ref(),
        service_manager(vec![]).into_ref(),
    )
    .with_property("WebProxy", proxy.clone());
    let log = remote.log();
    let factory: Rc<dyn ObjectFactory> =
        Rc::new(MemoryFactory::new().register_object(prog_id::UPDATE_SESSION, remote.into_ref()));
    let session = UpdateSession::new(factory).unwrap();

    let current = session.web_proxy().unwrap().unwrap();
    assert_eq!(current.address, "proxy.corp.example:8080");
    assert_eq!(current.bypass_list, vec!["<local>"]);

    session.set_web_proxy(&current).unwrap();
    let put = log.last("WebProxy").unwrap();
    assert_eq!(put.kind, CallKind::Put);
    match &put.args[..] {
        [Value::Object(written)] => assert!(written.ptr_eq(&proxy)),
        other => panic!("unexpected WebProxy write: {other:?}"),
    }
}

#[test]
#[serial]
fn rejected_web_proxy_write_is_reported() {
    init_tracing();
    let proxy = MemoryObject::new("WebProxy").missing_as_null().into_ref();
    let remote = session(
        searcher(search_result(vec![]), vec![]).into_ref(),
        downloader().into_ref(),
        installer().into_ref(),
        service_manager(vec![]).into_ref(),
    )
    .with_property("WebProxy", proxy)
    .with_put_error("WebProxy", "access denied");
    let factory: Rc<dyn ObjectFactory> =
        Rc::new(MemoryFactory::new().register_object(prog_id::UPDATE_SESSION, remote.into_ref()));
    let session = UpdateSession::new(factory).unwrap();
    let current = session.web_proxy().unwrap().unwrap();
    assert!(matches!(
        session.set_web_proxy(&current),
        Err(UpdateAgentError::Remote { .. })
    ));
}

#[test]
#[serial]
fn session_config_is_applied_to_created_objects() {
    init_tracing();
    let agent = Agent::new();
    let config = SessionConfig::builder()
        .client_application_id("patch-agent".to_owned())
        .unwrap()
        .searcher(
            SearcherConfig::builder()
                .server_selection(ServerSelection::WindowsUpdate)
                .online(false)
                .build()
                .unwrap(),
        )
        .download_priority(DownloadPriority::High)
        .force_quiet(true)
        .build();

    let session = UpdateSession::with_config(agent.factory(), config).unwrap();
    assert_eq!(session.client_application_id(), "patch-agent");

    let searcher = session.create_update_searcher().unwrap();
    assert_eq!(searcher.server_selection(), ServerSelection::WindowsUpdate.code());
    assert!(!searcher.online());

    let downloader = session.create_update_downloader().unwrap();
    assert_eq!(downloader.priority(), Some(DownloadPriority::High));
    let put = agent.downloader.last("Priority").unwrap();
    assert_eq!(put.kind, CallKind::Put);
    assert_eq!(put.args, vec![Value::I32(3)]);

    let installer = session.create_update_installer().unwrap();
    assert!(installer.force_quiet());
    // Not configured, so never written.
    assert_eq!(agent.installer.count("AllowSourcePrompts"), 1);
}

#[test]
#[serial]
fn search_materializes_updates_and_categories() {
    init_tracing();
    let agent = Agent::new();
    let session = UpdateSession::new(agent.factory()).unwrap();
    let searcher = session.create_update_searcher().unwrap();

    let result = searcher.search("IsInstalled=0 and Type='Software'").unwrap();
    assert_eq!(result.result_code(), Some(OperationResultCode::Succeeded));
    assert_eq!(result.updates.len(), 2);
    assert_eq!(
        result.updates[0].identity.as_ref().unwrap().update_id,
        "0a4b5c6d"
    );
    assert_eq!(result.updates[1].kb_article_ids, vec!["5034441"]);
    assert!(result.warnings.is_empty());

    let names: Vec<_> = result.root_categories[0]
        .walk()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Windows 11", "Security Updates"]);

    let search = agent.searcher.last("Search").unwrap();
    assert_eq!(
        search.args,
        vec![Value::from("IsInstalled=0 and Type='Software'")]
    );
}

#[test]
#[serial]
fn history_pages_and_full_history() {
    init_tracing();
    let agent = Agent::new();
    let session = UpdateSession::new(agent.factory()).unwrap();
    let searcher = session.create_update_searcher().unwrap();

    let page = searcher.query_history(1, 1).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "Windows Malicious Software Removal Tool");
    assert_eq!(page[0].result_code(), Some(OperationResultCode::Failed));

    assert_eq!(searcher.total_history_count().unwrap(), 3);
    let all = searcher.query_history_all().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|entry| entry.date.is_some()));

    assert_eq!(searcher.escape_string("it's").unwrap(), "it''s");
}

#[test]
#[serial]
fn download_and_install_send_the_same_update_objects() {
    init_tracing();
    let agent = Agent::new();
    let session = UpdateSession::new(agent.factory()).unwrap();
    let result = session
        .create_update_searcher()
        .unwrap()
        .search("IsInstalled=0")
        .unwrap();

    let downloader = session.create_update_downloader().unwrap();
    let downloaded = downloader.download(&result.updates).unwrap();
    assert_eq!(downloaded.result_code(), Some(OperationResultCode::Succeeded));
    let sent = agent.outbound.borrow()[0].values();
    assert_eq!(sent.len(), 2);
    for (sent, update) in sent.iter().zip(&result.updates) {
        match sent {
            Value::Object(obj) => assert!(obj.ptr_eq(update.dispatch())),
            other => panic!("expected object, got {other:?}"),
        }
    }
    let per_update = downloaded.update_result(0).unwrap().unwrap();
    assert_eq!(per_update.hresult, 0);

    let installer = session.create_update_installer().unwrap();
    assert!(!installer.is_busy().unwrap());
    let installed = installer.install(&result.updates).unwrap();
    assert!(installed.reboot_required);
    assert_eq!(installer.updates().unwrap().len(), 2);
    assert_eq!(agent.outbound.borrow().len(), 2);
    assert_eq!(agent.installer.count("Install"), 1);

    let removed = installer.uninstall(&result.updates[..1]).unwrap();
    assert_eq!(
        removed.result_code(),
        Some(OperationResultCode::SucceededWithErrors)
    );
}

#[test]
#[serial]
fn remote_install_failure_keeps_hresult() {
    init_tracing();
    let agent = Agent::with_installer(installer().with_method("Install", |_| {
        Err(UpdateAgentError::remote_with_code(
            0x8024_0024_u32 as i32,
            "There are no updates",
        ))
    }));
    let session = UpdateSession::new(agent.factory()).unwrap();
    let err = session
        .create_update_installer()
        .unwrap()
        .install(&[])
        .unwrap_err();
    assert_eq!(err.hresult(), Some(0x8024_0024_u32 as i32));
    assert!(matches!(err, UpdateAgentError::Remote { .. }));
    assert_eq!(agent.installer.count("Install"), 1);
}
